use crate::calc::{AttendanceRecord, CalcError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub roll_number: String,
    pub department: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub faculty_id: String,
    pub department: String,
    pub specialization: String,
}

/// A course with the current learner's cumulative attendance in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SubjectWire", into = "SubjectWire")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    pub attendance: AttendanceRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectWire {
    id: String,
    name: String,
    code: String,
    total_classes: u32,
    attended_classes: u32,
}

impl TryFrom<SubjectWire> for Subject {
    type Error = CalcError;

    fn try_from(w: SubjectWire) -> Result<Self, Self::Error> {
        Ok(Subject {
            attendance: AttendanceRecord::new(w.attended_classes, w.total_classes)?,
            id: w.id,
            name: w.name,
            code: w.code,
        })
    }
}

impl From<Subject> for SubjectWire {
    fn from(s: Subject) -> Self {
        SubjectWire {
            total_classes: s.attendance.total(),
            attended_classes: s.attendance.attended(),
            id: s.id,
            name: s.name,
            code: s.code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Present,
    Absent,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: String,
    pub subject_id: String,
    pub date: chrono::NaiveDate,
    pub topic: String,
    pub status: SessionStatus,
    pub smart_notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    System,
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub date: chrono::NaiveDate,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

/// Teacher's roll-call mark for one student in the selected subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    #[default]
    Present,
    Absent,
}

impl Mark {
    pub fn toggled(self) -> Self {
        match self {
            Mark::Present => Mark::Absent,
            Mark::Absent => Mark::Present,
        }
    }
}
