use crate::calc::classify;
use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::Mark;
use crate::store::RosterEntry;
use serde_json::json;

fn roster_row(entry: &RosterEntry) -> serde_json::Value {
    json!({
        "student": entry.student,
        "percentage": entry.percentage,
        "risk": classify(entry.percentage),
        "mark": entry.mark,
    })
}

fn handle_attendance_roster(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match state.store.subject(&subject_id) {
        Ok(s) => s,
        Err(e) => return store_err(&req.id, e),
    };
    let roster = match state.store.roster(&subject_id) {
        Ok(r) => r,
        Err(e) => return store_err(&req.id, e),
    };
    let absent = roster
        .iter()
        .filter(|r| r.mark == Mark::Absent)
        .count();
    ok(
        &req.id,
        json!({
            "subject": subject,
            "students": roster.iter().map(roster_row).collect::<Vec<_>>(),
            "absentCount": absent,
        }),
    )
}

fn handle_attendance_mark(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.toggle_mark(&subject_id, &student_id) {
        Ok(mark) => ok(
            &req.id,
            json!({ "subjectId": subject_id, "studentId": student_id, "mark": mark }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.roster" => Some(handle_attendance_roster(state, req)),
        "attendance.mark" => Some(handle_attendance_mark(state, req)),
        _ => None,
    }
}
