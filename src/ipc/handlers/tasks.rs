use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::NewTask;
use serde_json::json;

fn handle_tasks_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let tasks = state.store.tasks();
    let completed = tasks.iter().filter(|t| t.completed).count();
    ok(
        &req.id,
        json!({
            "tasks": tasks,
            "completedCount": completed,
            "totalCount": tasks.len(),
        }),
    )
}

fn parse_new_task(req: &Request) -> Result<NewTask, serde_json::Value> {
    Ok(NewTask {
        title: required_str(req, "title")?,
        due_date: optional_str(req, "dueDate")?,
        subject_id: optional_str(req, "subjectId")?,
    })
}

fn handle_tasks_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.add_task(new) {
        Ok(task) => ok(&req.id, json!({ "task": task })),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_tasks_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let task_id = match required_str(req, "taskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.toggle_task(&task_id) {
        Ok(task) => ok(&req.id, json!({ "task": task })),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_tasks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let task_id = match required_str(req, "taskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.delete_task(&task_id) {
        Ok(()) => ok(&req.id, json!({ "taskId": task_id })),
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tasks.list" => Some(handle_tasks_list(state, req)),
        "tasks.create" => Some(handle_tasks_create(state, req)),
        "tasks.toggle" => Some(handle_tasks_toggle(state, req)),
        "tasks.delete" => Some(handle_tasks_delete(state, req)),
        _ => None,
    }
}
