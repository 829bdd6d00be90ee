use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{optional_count, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::NewSubject;
use serde_json::json;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "subjects": state.store.subjects() }))
}

fn parse_new_subject(req: &Request) -> Result<NewSubject, serde_json::Value> {
    Ok(NewSubject {
        name: required_str(req, "name")?,
        code: required_str(req, "code")?,
        total_classes: optional_count(req, "totalClasses")?,
        attended_classes: optional_count(req, "attendedClasses")?,
    })
}

fn handle_subjects_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_subject(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.add_subject(new) {
        Ok(subject) => {
            tracing::info!(subject_id = %subject.id, code = %subject.code, "subject added");
            ok(&req.id, json!({ "subject": subject }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_subjects_sessions(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.sessions_for(&subject_id) {
        Ok(sessions) => ok(
            &req.id,
            json!({ "subjectId": subject_id, "sessions": sessions }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "subjects.create" => Some(handle_subjects_create(state, req)),
        "subjects.sessions" => Some(handle_subjects_sessions(state, req)),
        _ => None,
    }
}
