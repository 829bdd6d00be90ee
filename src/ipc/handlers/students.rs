use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::NewStudent;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "students": state.store.students() }))
}

fn parse_new_student(req: &Request) -> Result<NewStudent, serde_json::Value> {
    Ok(NewStudent {
        name: required_str(req, "name")?,
        roll_number: required_str(req, "rollNumber")?,
        email: optional_str(req, "email")?,
        department: optional_str(req, "department")?,
    })
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_student(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.add_student(new) {
        Ok(student) => {
            tracing::info!(student_id = %student.id, "student added");
            ok(&req.id, json!({ "student": student }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        _ => None,
    }
}
