pub mod analytics;
pub mod attendance;
pub mod core;
pub mod insights;
pub mod notifications;
pub mod students;
pub mod subjects;
pub mod tasks;
