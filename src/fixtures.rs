use crate::model::{ClassSession, Notification, Student, Subject, Task, Teacher};
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_SEED: &str = include_str!("../fixtures/seed.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    pub students: Vec<Student>,
    pub teacher: Teacher,
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub sessions: Vec<ClassSession>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

pub fn default_seed() -> anyhow::Result<SeedData> {
    parse_seed(DEFAULT_SEED).context("embedded seed fixture is invalid")
}

pub fn load_seed(path: Option<&Path>) -> anyhow::Result<SeedData> {
    let Some(path) = path else {
        return default_seed();
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    parse_seed(&text).with_context(|| format!("parsing seed file {}", path.display()))
}

fn parse_seed(text: &str) -> anyhow::Result<SeedData> {
    let seed: SeedData = serde_json::from_str(text)?;

    let mut seen = HashSet::new();
    for s in &seed.subjects {
        if !seen.insert(s.id.as_str()) {
            anyhow::bail!("duplicate subject id {}", s.id);
        }
    }
    let mut seen = HashSet::new();
    for s in &seed.students {
        if !seen.insert(s.id.as_str()) {
            anyhow::bail!("duplicate student id {}", s.id);
        }
    }
    for session in &seed.sessions {
        if !has_subject(&seed.subjects, &session.subject_id) {
            anyhow::bail!(
                "session {} refers to unknown subject {}",
                session.id,
                session.subject_id
            );
        }
    }
    Ok(seed)
}

fn has_subject(subjects: &[Subject], id: &str) -> bool {
    subjects.iter().any(|s| s.id == id)
}
