use crate::calc::{self, AttendanceRecord, CalcError};
use crate::fixtures::SeedData;
use crate::model::{
    ClassSession, Mark, Notification, NotificationKind, Student, Subject, Task, Teacher,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_TOTAL_CLASSES: u32 = 20;
pub const NEW_STUDENT_YEAR: &str = "1st Year";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Calc(#[from] CalcError),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Invalid(_) => "bad_params",
            StoreError::Calc(e) => e.code(),
        }
    }

    fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub email: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub total_classes: Option<u32>,
    pub attended_classes: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub due_date: Option<String>,
    pub subject_id: Option<String>,
}

/// One learner's row in a subject roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub student: Student,
    pub percentage: u32,
    pub mark: Mark,
}

/// Everything the dashboards read and edit during one session.
#[derive(Debug, Clone)]
pub struct Store {
    students: Vec<Student>,
    teacher: Teacher,
    subjects: Vec<Subject>,
    sessions: Vec<ClassSession>,
    notifications: Vec<Notification>,
    tasks: Vec<Task>,
    // subject id -> student id -> mark; absent entries read as present
    marks: HashMap<String, HashMap<String, Mark>>,
}

fn required(value: &str, field: &str) -> Result<String, StoreError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(StoreError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn avatar_url(name: &str) -> String {
    let encoded = name.split_whitespace().collect::<Vec<_>>().join("+");
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        encoded
    )
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

impl Store {
    pub fn from_seed(seed: SeedData) -> Self {
        Self {
            students: seed.students,
            teacher: seed.teacher,
            subjects: seed.subjects,
            sessions: seed.sessions,
            notifications: seed.notifications,
            tasks: seed.tasks,
            marks: HashMap::new(),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: &str) -> Result<&Student, StoreError> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("student", id))
    }

    /// The learner the student dashboard opens on.
    pub fn primary_student(&self) -> Result<&Student, StoreError> {
        self.students
            .first()
            .ok_or_else(|| StoreError::not_found("student", "<first>"))
    }

    pub fn add_student(&mut self, new: NewStudent) -> Result<Student, StoreError> {
        let name = required(&new.name, "name")?;
        let roll_number = required(&new.roll_number, "rollNumber")?;
        let student = Student {
            id: Uuid::new_v4().to_string(),
            avatar: avatar_url(&name),
            name,
            email: non_blank(new.email).unwrap_or_default(),
            roll_number,
            department: non_blank(new.department).unwrap_or_default(),
            year: NEW_STUDENT_YEAR.to_string(),
        };
        self.students.push(student.clone());
        Ok(student)
    }

    pub fn teacher(&self) -> &Teacher {
        &self.teacher
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: &str) -> Result<&Subject, StoreError> {
        self.subjects
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("subject", id))
    }

    pub fn add_subject(&mut self, new: NewSubject) -> Result<Subject, StoreError> {
        let name = required(&new.name, "name")?;
        let code = required(&new.code, "code")?;
        let attendance = AttendanceRecord::new(
            new.attended_classes.unwrap_or(0),
            new.total_classes.unwrap_or(DEFAULT_TOTAL_CLASSES),
        )?;
        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name,
            code,
            attendance,
        };
        self.subjects.push(subject.clone());
        Ok(subject)
    }

    /// Class history for a subject, newest first.
    pub fn sessions_for(&self, subject_id: &str) -> Result<Vec<ClassSession>, StoreError> {
        self.subject(subject_id)?;
        let mut out: Vec<ClassSession> = self
            .sessions
            .iter()
            .filter(|s| s.subject_id == subject_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn add_task(&mut self, new: NewTask) -> Result<Task, StoreError> {
        let title = required(&new.title, "title")?;
        let subject_id = non_blank(new.subject_id);
        if let Some(id) = subject_id.as_deref() {
            self.subject(id)?;
        }
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title,
            completed: false,
            due_date: non_blank(new.due_date),
            subject_id,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn toggle_task(&mut self, id: &str) -> Result<Task, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("task", id))?;
        task.completed = !task.completed;
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(StoreError::not_found("task", id));
        }
        Ok(())
    }

    /// Newest notifications come first.
    pub fn push_notification(
        &mut self,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, StoreError> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            title: required(title, "title")?,
            message: required(message, "message")?,
            date: today(),
            kind,
            read: false,
        };
        self.notifications.insert(0, notification.clone());
        Ok(notification)
    }

    /// Stored notifications followed by one warning per subject that falls short.
    pub fn student_alerts(&self, today: NaiveDate) -> Vec<Notification> {
        let system = self
            .subjects
            .iter()
            .filter(|s| s.attendance.falls_short())
            .map(|s| Notification {
                id: format!("sys-{}", s.id),
                title: "Low Attendance Warning".to_string(),
                message: format!(
                    "Your attendance in {} is below 75%. Please attend upcoming classes.",
                    s.name
                ),
                date: today,
                kind: NotificationKind::System,
                read: false,
            });
        self.notifications.iter().cloned().chain(system).collect()
    }

    pub fn mark(&self, subject_id: &str, student_id: &str) -> Mark {
        self.marks
            .get(subject_id)
            .and_then(|m| m.get(student_id))
            .copied()
            .unwrap_or_default()
    }

    /// Every student's attendance in `subject_id`, in enrolment order.
    pub fn roster(&self, subject_id: &str) -> Result<Vec<RosterEntry>, StoreError> {
        let subject = self.subject(subject_id)?;
        Ok(self
            .students
            .iter()
            .map(|st| RosterEntry {
                percentage: calc::mock_roster_percentage(&st.id, &subject.code),
                mark: self.mark(subject_id, &st.id),
                student: st.clone(),
            })
            .collect())
    }

    pub fn toggle_mark(&mut self, subject_id: &str, student_id: &str) -> Result<Mark, StoreError> {
        self.subject(subject_id)?;
        self.student(student_id)?;
        let slot = self
            .marks
            .entry(subject_id.to_string())
            .or_default()
            .entry(student_id.to_string())
            .or_default();
        *slot = slot.toggled();
        Ok(*slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::default_seed;

    fn store() -> Store {
        Store::from_seed(default_seed().expect("seed"))
    }

    #[test]
    fn add_student_fills_defaults() {
        let mut s = store();
        let created = s
            .add_student(NewStudent {
                name: "Riley  Park".into(),
                roll_number: "2024-CS-100".into(),
                ..Default::default()
            })
            .expect("create student");
        assert_eq!(created.year, "1st Year");
        assert_eq!(
            created.avatar,
            "https://ui-avatars.com/api/?name=Riley+Park&background=random"
        );
        assert_eq!(s.students().len(), 3);
        assert_eq!(s.students()[2].id, created.id);
    }

    #[test]
    fn add_student_requires_roll_number() {
        let mut s = store();
        let err = s
            .add_student(NewStudent {
                name: "Riley".into(),
                roll_number: "  ".into(),
                ..Default::default()
            })
            .expect_err("blank roll number");
        assert_eq!(err.code(), "bad_params");
        assert_eq!(s.students().len(), 2);
    }

    #[test]
    fn add_subject_defaults_and_validation() {
        let mut s = store();
        let sub = s
            .add_subject(NewSubject {
                name: "Compilers".into(),
                code: "CS-410".into(),
                ..Default::default()
            })
            .expect("create subject");
        assert_eq!(sub.attendance.total(), 20);
        assert_eq!(sub.attendance.attended(), 0);

        let err = s
            .add_subject(NewSubject {
                name: "Bad".into(),
                code: "B-1".into(),
                total_classes: Some(3),
                attended_classes: Some(4),
            })
            .expect_err("overfull");
        assert_eq!(err.code(), "bad_params");
        assert_eq!(s.subjects().len(), 5);
    }

    #[test]
    fn sessions_are_newest_first() {
        let s = store();
        let ids: Vec<_> = s
            .sessions_for("sub2")
            .expect("sessions")
            .into_iter()
            .map(|x| x.id)
            .collect();
        assert_eq!(ids, vec!["n4", "n3", "n2", "n1"]);
        assert_eq!(s.sessions_for("nope").expect_err("missing").code(), "not_found");
    }

    #[test]
    fn task_lifecycle() {
        let mut s = store();
        let t = s
            .add_task(NewTask {
                title: "Revise backprop".into(),
                due_date: Some(String::new()),
                subject_id: Some("sub2".into()),
            })
            .expect("add task");
        assert!(!t.completed);
        assert_eq!(t.due_date, None);

        assert!(s.toggle_task(&t.id).expect("toggle").completed);
        assert!(!s.toggle_task(&t.id).expect("toggle back").completed);

        s.delete_task(&t.id).expect("delete");
        assert_eq!(s.tasks().len(), 3);
        assert_eq!(s.delete_task(&t.id).expect_err("gone").code(), "not_found");
    }

    #[test]
    fn notifications_are_prepended() {
        let mut s = store();
        let n = s
            .push_notification("Exam moved", "Now on Friday", NotificationKind::Teacher)
            .expect("push");
        let alerts = s.student_alerts(today());
        assert_eq!(alerts[0].id, n.id);
        assert_eq!(alerts[1].id, "n1");
        assert!(s
            .push_notification("", "x", NotificationKind::Teacher)
            .is_err());
    }

    #[test]
    fn student_alerts_append_low_attendance_warnings() {
        let s = store();
        let day = NaiveDate::from_ymd_opt(2023, 10, 10).expect("date");
        let alerts = s.student_alerts(day);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, "n1");
        assert_eq!(alerts[1].id, "sys-sub2");
        assert_eq!(alerts[1].kind, NotificationKind::System);
        assert!(alerts[1].message.contains("Neural Networks"));
        assert_eq!(alerts[1].date, day);
    }

    #[test]
    fn roster_covers_every_student() {
        let mut s = store();
        s.toggle_mark("sub2", "s2").expect("toggle");
        let roster = s.roster("sub2").expect("roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].student.id, "s1");
        assert_eq!(roster[0].percentage, 99);
        assert_eq!(roster[0].mark, Mark::Present);
        assert_eq!(roster[1].mark, Mark::Absent);
        assert!(roster.iter().all(|r| (50..=100).contains(&r.percentage)));
    }

    #[test]
    fn marks_default_present_and_toggle() {
        let mut s = store();
        assert_eq!(s.mark("sub1", "s1"), Mark::Present);
        assert_eq!(s.toggle_mark("sub1", "s1").expect("toggle"), Mark::Absent);
        assert_eq!(s.mark("sub1", "s1"), Mark::Absent);
        assert_eq!(s.mark("sub2", "s1"), Mark::Present);
        assert!(s.toggle_mark("sub1", "ghost").is_err());
    }
}
