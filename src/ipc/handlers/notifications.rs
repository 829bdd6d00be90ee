use crate::calc::{classify, Risk};
use crate::ipc::error::{ok, store_err};
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::NotificationKind;
use crate::store::today;
use serde_json::json;

fn handle_notifications_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let alerts = state.store.student_alerts(today());
    let unread = alerts.iter().filter(|n| !n.read).count();
    ok(
        &req.id,
        json!({ "notifications": alerts, "unreadCount": unread }),
    )
}

fn handle_notifications_send(state: &mut AppState, req: &Request) -> serde_json::Value {
    let title = match required_str(req, "title") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let message = match required_str(req, "message") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state
        .store
        .push_notification(&title, &message, NotificationKind::Teacher)
    {
        Ok(n) => {
            tracing::info!(notification_id = %n.id, "broadcast sent");
            ok(&req.id, json!({ "notification": n }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_notifications_send_at_risk(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let custom = match optional_str(req, "message") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (title, message, recipients) = {
        let subject = match state.store.subject(&subject_id) {
            Ok(s) => s,
            Err(e) => return store_err(&req.id, e),
        };
        let roster = match state.store.roster(&subject_id) {
            Ok(r) => r,
            Err(e) => return store_err(&req.id, e),
        };
        let recipients = roster
            .iter()
            .filter(|r| classify(r.percentage) == Risk::AtRisk)
            .count();
        let message = custom.unwrap_or_else(|| {
            format!(
                "Warning: Your attendance in {} ({}) is below 75%. Please attend upcoming classes to improve your standing.",
                subject.name, subject.code
            )
        });
        (
            format!("Attendance Alert: {}", subject.name),
            message,
            recipients,
        )
    };

    match state
        .store
        .push_notification(&title, &message, NotificationKind::Teacher)
    {
        Ok(n) => {
            tracing::info!(%subject_id, recipients, "at-risk alert sent");
            ok(
                &req.id,
                json!({ "notification": n, "recipients": recipients }),
            )
        }
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notifications.list" => Some(handle_notifications_list(state, req)),
        "notifications.send" => Some(handle_notifications_send(state, req)),
        "notifications.sendAtRisk" => Some(handle_notifications_send_at_risk(state, req)),
        _ => None,
    }
}
