use crate::calc::{self, AttendanceRecord};
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Student, Subject};
use serde_json::json;

fn parse_records(req: &Request) -> Result<Vec<AttendanceRecord>, serde_json::Value> {
    let Some(raw) = req.params.get("records") else {
        return Err(err(&req.id, "bad_params", "missing records", None));
    };
    serde_json::from_value::<Vec<AttendanceRecord>>(raw.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid records: {}", e), None))
}

fn parse_threshold(req: &Request) -> Result<Option<f64>, serde_json::Value> {
    match req.params.get("threshold") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => {
            let Some(t) = v.as_f64() else {
                return Err(err(&req.id, "bad_params", "threshold must be a number", None));
            };
            calc::validate_threshold(t)
                .map(Some)
                .map_err(|e| err(&req.id, e.code(), e.to_string(), None))
        }
    }
}

/// Cohort block shared by every analytics view.
fn cohort_json(percentages: &[u32]) -> serde_json::Value {
    json!({
        "percentages": percentages,
        "aggregate": calc::aggregate(percentages),
        "histogram": calc::histogram(percentages),
    })
}

fn subject_row(subject: &Subject) -> serde_json::Value {
    let mut row = json!(calc::standing(&subject.attendance));
    row["subjectId"] = json!(subject.id);
    row["name"] = json!(subject.name);
    row["code"] = json!(subject.code);
    row
}

/// Recovery targets follow `threshold` when one was requested.
fn standing_at(tally: calc::Tally, threshold: Option<f64>) -> Result<calc::Standing, calc::CalcError> {
    match threshold {
        Some(t) => tally.standing_with(t),
        None => Ok(tally.standing()),
    }
}

fn handle_analytics_evaluate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = match parse_records(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let threshold = match parse_threshold(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let mut standings = Vec::with_capacity(records.len());
    for r in &records {
        match standing_at(calc::Tally::from(r), threshold) {
            Ok(s) => standings.push(s),
            Err(e) => return err(&req.id, e.code(), e.to_string(), None),
        }
    }
    let overall = match standing_at(calc::overall(records.iter()), threshold) {
        Ok(s) => s,
        Err(e) => return err(&req.id, e.code(), e.to_string(), None),
    };
    let percentages: Vec<u32> = records.iter().map(|r| r.percentage()).collect();

    ok(
        &req.id,
        json!({
            "threshold": threshold.unwrap_or(calc::RECOVERY_THRESHOLD),
            "standings": standings,
            "overall": overall,
            "cohort": cohort_json(&percentages),
        }),
    )
}

fn resolve_student<'a>(state: &'a AppState, req: &Request) -> Result<&'a Student, serde_json::Value> {
    let requested = optional_str(req, "studentId")?;
    let found = match requested {
        Some(id) => state.store.student(&id),
        None => state.store.primary_student(),
    };
    found.map_err(|e| store_err(&req.id, e))
}

fn handle_analytics_student_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student = match resolve_student(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let subjects = state.store.subjects();
    let percentages: Vec<u32> = subjects.iter().map(|s| s.attendance.percentage()).collect();
    let overall = calc::overall(subjects.iter().map(|s| &s.attendance));

    ok(
        &req.id,
        json!({
            "student": student,
            "overall": overall.standing(),
            "subjects": subjects.iter().map(subject_row).collect::<Vec<_>>(),
            "lowSubjectIds": subjects
                .iter()
                .filter(|s| s.attendance.falls_short())
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>(),
            "cohort": cohort_json(&percentages),
        }),
    )
}

fn handle_analytics_subject_open(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    let percentages: Vec<u32> = roster.iter().map(|r| r.percentage).collect();
    let students = roster
        .iter()
        .map(|r| {
            json!({
                "studentId": r.student.id,
                "name": r.student.name,
                "rollNumber": r.student.roll_number,
                "percentage": r.percentage,
                "risk": calc::classify(r.percentage),
            })
        })
        .collect::<Vec<_>>();

    ok(
        &req.id,
        json!({
            "subject": subject,
            "students": students,
            "cohort": cohort_json(&percentages),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.evaluate" => Some(handle_analytics_evaluate(state, req)),
        "analytics.student.open" => Some(handle_analytics_student_open(state, req)),
        "analytics.subject.open" => Some(handle_analytics_subject_open(state, req)),
        _ => None,
    }
}
