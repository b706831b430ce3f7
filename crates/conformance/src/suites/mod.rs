//! In-code fixture suites

pub mod categories;
pub mod projects;
pub mod todos;
