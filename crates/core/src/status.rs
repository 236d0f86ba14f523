//! Job status state machine.
//!
//! A job moves `queued -> running -> {done | partial | error}`. The three
//! end states are terminal: once a job reaches one, no further automatic
//! transition is allowed. Re-queuing an errored job is an operator action
//! outside this subsystem.

use crate::error::CoreError;

/// Lifecycle status of a pricing job. Stored as TEXT in the `jobs` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Created at submission, waiting to be dequeued.
    Queued,
    /// Claimed by a worker, legs are being priced.
    Running,
    /// Every leg priced with a non-null price; total is the exact sum.
    Done,
    /// At least one leg had no offer; total is null, per-leg detail kept.
    Partial,
    /// Leg construction or pricing infrastructure failed; no result row.
    Error,
}

impl JobStatus {
    /// Database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Partial => "partial",
            JobStatus::Error => "error",
        }
    }

    /// Parse the database representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            "partial" => Ok(JobStatus::Partial),
            "error" => Ok(JobStatus::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown job status: {other}"
            ))),
        }
    }

    /// Whether no further automatic transition is allowed from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Partial | JobStatus::Error)
    }

    /// The set of statuses reachable from this one.
    ///
    /// Terminal states return an empty slice.
    pub fn valid_transitions(self) -> &'static [JobStatus] {
        match self {
            JobStatus::Queued => &[JobStatus::Running],
            JobStatus::Running => {
                &[JobStatus::Done, JobStatus::Partial, JobStatus::Error]
            }
            JobStatus::Done | JobStatus::Partial | JobStatus::Error => &[],
        }
    }

    /// Check whether `self -> to` is a valid transition.
    pub fn can_transition(self, to: JobStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_only_advances_to_running() {
        assert_eq!(JobStatus::Queued.valid_transitions(), &[JobStatus::Running]);
        assert!(JobStatus::Queued.can_transition(JobStatus::Running));
        assert!(!JobStatus::Queued.can_transition(JobStatus::Done));
    }

    #[test]
    fn running_reaches_every_terminal_state() {
        assert!(JobStatus::Running.can_transition(JobStatus::Done));
        assert!(JobStatus::Running.can_transition(JobStatus::Partial));
        assert!(JobStatus::Running.can_transition(JobStatus::Error));
        assert!(!JobStatus::Running.can_transition(JobStatus::Queued));
    }

    #[test]
    fn terminal_states_never_regress() {
        for status in [JobStatus::Done, JobStatus::Partial, JobStatus::Error] {
            assert!(status.is_terminal());
            assert!(status.valid_transitions().is_empty());
        }
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn round_trips_through_text() {
        for status in [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Done,
            JobStatus::Partial,
            JobStatus::Error,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(JobStatus::parse("cancelled").is_err());
    }
}
