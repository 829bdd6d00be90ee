use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::summary;
use serde_json::json;

fn handle_insights_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let requested = match optional_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student = match requested {
        Some(id) => state.store.student(&id),
        None => state.store.primary_student(),
    };
    let student = match student {
        Ok(s) => s,
        Err(e) => return store_err(&req.id, e),
    };
    let text = summary::attendance_insights(
        state.generator.as_ref(),
        &student.name,
        state.store.subjects(),
    );
    ok(&req.id, json!({ "studentId": student.id, "text": text }))
}

fn handle_insights_parent_email(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student = match state.store.student(&student_id) {
        Ok(s) => s,
        Err(e) => return store_err(&req.id, e),
    };
    let text = summary::parent_email(state.generator.as_ref(), student, state.store.subjects());
    ok(&req.id, json!({ "studentId": student.id, "text": text }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "insights.student" => Some(handle_insights_student(state, req)),
        "insights.parentEmail" => Some(handle_insights_parent_email(state, req)),
        _ => None,
    }
}
