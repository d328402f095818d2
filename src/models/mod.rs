//! Domain model module declarations.

pub mod job_type;
pub mod member;
pub mod project;
pub mod report;
pub mod sms_log;
pub mod task;
