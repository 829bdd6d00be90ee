use crate::model::{Student, Subject};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SERVICE_UNAVAILABLE: &str = "Service temporarily unavailable.";
pub const INSIGHTS_EMPTY: &str = "Unable to retrieve insights at this time.";
pub const EMAIL_EMPTY: &str = "Error generating email draft.";
pub const NO_ALERTS: &str = "No alerts necessary. Student is in good standing.";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("no API key configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Free-text generation backed by some external service.
pub trait SummaryGenerator {
    fn kind(&self) -> &'static str;

    /// One attempt against the backend.
    fn generate(&self, prompt: &str) -> Result<String, SummaryError>;

    /// Never fails: blank output yields `empty_fallback`, errors yield
    /// [`SERVICE_UNAVAILABLE`]. Only real failures are logged at warn.
    fn summarize(&self, prompt: &str, empty_fallback: &str) -> String {
        match self.generate(prompt) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => empty_fallback.to_string(),
            Err(SummaryError::NotConfigured) => {
                tracing::debug!(generator = self.kind(), "no API key; using fallback");
                SERVICE_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::warn!(generator = self.kind(), error = %e, "summary generation failed");
                SERVICE_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Used when no API key is configured.
pub struct Disabled;

impl SummaryGenerator for Disabled {
    fn kind(&self) -> &'static str {
        "disabled"
    }

    fn generate(&self, _prompt: &str) -> Result<String, SummaryError> {
        Err(SummaryError::NotConfigured)
    }
}

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(api_base: &str, model: &str, api_key: &str) -> Result<Self, SummaryError> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                api_base.trim_end_matches('/'),
                model
            ),
            api_key: api_key.to_string(),
        })
    }
}

impl SummaryGenerator for GeminiClient {
    fn kind(&self) -> &'static str {
        "gemini"
    }

    fn generate(&self, prompt: &str) -> Result<String, SummaryError> {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?
            .error_for_status()?;
        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| SummaryError::MalformedResponse(e.to_string()))?;
        Ok(parsed.into_text())
    }
}

pub fn insights_prompt(student_name: &str, subjects: &[Subject]) -> String {
    let data = subjects
        .iter()
        .map(|s| {
            format!(
                "{}: {}/{} attended",
                s.name,
                s.attendance.attended(),
                s.attendance.total()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a helpful academic counselor at a university.\n\
         Student Name: {student_name}\n\
         Attendance Data:\n\
         {data}\n\n\
         Provide a concise, professional analysis of this attendance.\n\
         If attendance is low (<75%) in any subject, suggest specific improvement steps politely.\n\
         If attendance is high, encourage them to keep it up.\n\
         Keep the tone supportive and realistic. Max 50 words."
    )
}

pub fn attendance_insights(
    generator: &dyn SummaryGenerator,
    student_name: &str,
    subjects: &[Subject],
) -> String {
    generator.summarize(&insights_prompt(student_name, subjects), INSIGHTS_EMPTY)
}

pub fn parent_email_prompt(student_name: &str, low: &[&Subject]) -> String {
    let names = low
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Draft a polite, professional email to the parents of {student_name}.\n\
         The student has low attendance in: {names}.\n\
         The tone should be concerned but helpful, inviting the parents to discuss how we can support the student.\n\
         Sign off as \"Academic Affairs Office\".\n\
         Keep it plain text."
    )
}

/// Skips the service entirely when no subject falls short.
pub fn parent_email(
    generator: &dyn SummaryGenerator,
    student: &Student,
    subjects: &[Subject],
) -> String {
    let low: Vec<&Subject> = subjects
        .iter()
        .filter(|s| s.attendance.falls_short())
        .collect();
    if low.is_empty() {
        return NO_ALERTS.to_string();
    }
    generator.summarize(&parent_email_prompt(&student.name, &low), EMAIL_EMPTY)
}
