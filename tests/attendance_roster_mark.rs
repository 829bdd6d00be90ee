mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar};

#[test]
fn roll_call_marks_toggle_per_subject() {
    let mut sc = spawn_sidecar();

    let roster = request_ok(&mut sc, "1", "attendance.roster", json!({ "subjectId": "sub2" }));
    let rows = roster["students"].as_array().expect("students");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["mark"] == "present"));
    assert_eq!(rows[0]["percentage"], 99);
    assert_eq!(rows[1]["percentage"], 100);
    assert_eq!(roster["absentCount"], 0);

    let marked = request_ok(
        &mut sc,
        "2",
        "attendance.mark",
        json!({ "subjectId": "sub2", "studentId": "s2" }),
    );
    assert_eq!(marked["mark"], "absent");

    let roster = request_ok(&mut sc, "3", "attendance.roster", json!({ "subjectId": "sub2" }));
    assert_eq!(roster["students"][1]["mark"], "absent");
    assert_eq!(roster["absentCount"], 1);

    // other subjects keep their own marks
    let other = request_ok(&mut sc, "4", "attendance.roster", json!({ "subjectId": "sub1" }));
    assert_eq!(other["absentCount"], 0);

    let back = request_ok(
        &mut sc,
        "5",
        "attendance.mark",
        json!({ "subjectId": "sub2", "studentId": "s2" }),
    );
    assert_eq!(back["mark"], "present");

    assert_eq!(
        request_err(
            &mut sc,
            "6",
            "attendance.mark",
            json!({ "subjectId": "sub2", "studentId": "ghost" })
        ),
        "not_found"
    );
}

#[test]
fn roster_flags_at_risk_rows() {
    let mut sc = spawn_sidecar();
    let roster = request_ok(&mut sc, "1", "attendance.roster", json!({ "subjectId": "sub4" }));
    assert_eq!(roster["students"][0]["percentage"], 71);
    assert_eq!(roster["students"][0]["risk"], "atRisk");
    assert_eq!(roster["students"][1]["percentage"], 72);
    assert_eq!(roster["subject"]["code"], "MAT-201");
}
