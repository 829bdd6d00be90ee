mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar};

fn counts(v: &serde_json::Value) -> Vec<u64> {
    v.as_array()
        .expect("histogram array")
        .iter()
        .map(|b| b["count"].as_u64().expect("count"))
        .collect()
}

#[test]
fn subject_view_aggregates_roster_percentages() {
    let mut sc = spawn_sidecar();

    let ethics = request_ok(
        &mut sc,
        "1",
        "analytics.subject.open",
        json!({ "subjectId": "sub3" }),
    );
    assert_eq!(ethics["subject"]["code"], "ETH-101");
    let pcts: Vec<u64> = ethics["students"]
        .as_array()
        .expect("students")
        .iter()
        .map(|s| s["percentage"].as_u64().expect("percentage"))
        .collect();
    assert_eq!(pcts, vec![69, 70]);
    assert_eq!(ethics["cohort"]["aggregate"]["mean"], 70);
    assert_eq!(ethics["cohort"]["aggregate"]["median"], 70);
    assert_eq!(ethics["cohort"]["aggregate"]["atRiskCount"], 2);
    assert_eq!(counts(&ethics["cohort"]["histogram"]), vec![0, 2, 0, 0]);
    assert_eq!(ethics["students"][0]["risk"], "atRisk");

    let physics = request_ok(
        &mut sc,
        "2",
        "analytics.subject.open",
        json!({ "subjectId": "sub1" }),
    );
    assert_eq!(physics["cohort"]["percentages"], json!([91, 92]));
    assert_eq!(physics["cohort"]["aggregate"]["mean"], 92);
    assert_eq!(physics["cohort"]["aggregate"]["atRiskCount"], 0);
    assert_eq!(counts(&physics["cohort"]["histogram"]), vec![0, 0, 0, 2]);
}

#[test]
fn subject_view_grows_with_new_students() {
    let mut sc = spawn_sidecar();
    let _ = request_ok(
        &mut sc,
        "1",
        "students.create",
        json!({ "name": "Riley Park", "rollNumber": "2024-CS-100" }),
    );
    let res = request_ok(
        &mut sc,
        "2",
        "analytics.subject.open",
        json!({ "subjectId": "sub4" }),
    );
    let students = res["students"].as_array().expect("students");
    assert_eq!(students.len(), 3);
    let total: u64 = counts(&res["cohort"]["histogram"]).iter().sum();
    assert_eq!(total, 3);
}

#[test]
fn subject_view_requires_known_subject() {
    let mut sc = spawn_sidecar();
    assert_eq!(
        request_err(&mut sc, "1", "analytics.subject.open", json!({})),
        "bad_params"
    );
    assert_eq!(
        request_err(
            &mut sc,
            "2",
            "analytics.subject.open",
            json!({ "subjectId": "sub9" })
        ),
        "not_found"
    );
}
