mod audit;
mod capture;
mod diff;

pub use audit::{run_audit_command, AuditArgs};
pub use capture::run_capture_command;
pub use diff::run_diff_command;
