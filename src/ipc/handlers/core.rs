use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "role": state.role,
            "generator": state.generator.kind(),
        }),
    )
}

fn handle_session_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "role") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(role) = Role::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "role must be student or teacher",
            Some(json!({ "role": raw })),
        );
    };

    let user = match role {
        Role::Student => match state.store.primary_student() {
            Ok(s) => json!(s),
            Err(e) => return store_err(&req.id, e),
        },
        Role::Teacher => json!(state.store.teacher()),
    };
    state.role = Some(role);
    tracing::info!(?role, "session opened");
    ok(&req.id, json!({ "role": role, "user": user }))
}

fn handle_session_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.role = None;
    ok(&req.id, json!({ "role": null }))
}

fn handle_teacher_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "teacher": state.store.teacher() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.login" => Some(handle_session_login(state, req)),
        "session.logout" => Some(handle_session_logout(state, req)),
        "teacher.get" => Some(handle_teacher_get(state, req)),
        _ => None,
    }
}
