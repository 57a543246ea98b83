//! Rebuild job vocabulary.

use serde::{Deserialize, Serialize};

/// What caused a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildReason {
    /// Fired by the interval timer.
    Periodic,
    /// Requested over the API.
    Manual,
}

impl std::fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebuildReason::Periodic => write!(f, "periodic"),
            RebuildReason::Manual => write!(f, "manual"),
        }
    }
}

/// Answer to a rebuild trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The job was accepted and handed to the rebuild worker.
    Accepted,
    /// A job is already running; this trigger was dropped, not queued.
    AlreadyInProgress,
}

/// Lifecycle phase of the current (or last) job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Building = 1,
    Validating = 2,
    Swapping = 3,
    Failed = 4,
}

impl Phase {
    pub(crate) fn from_u8(value: u8) -> Phase {
        match value {
            1 => Phase::Building,
            2 => Phase::Validating,
            3 => Phase::Swapping,
            4 => Phase::Failed,
            _ => Phase::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display() {
        assert_eq!(RebuildReason::Periodic.to_string(), "periodic");
        assert_eq!(RebuildReason::Manual.to_string(), "manual");
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&RebuildReason::Manual).unwrap();
        assert_eq!(json, "\"manual\"");
    }

    #[test]
    fn test_phase_round_trip() {
        for phase in [
            Phase::Idle,
            Phase::Building,
            Phase::Validating,
            Phase::Swapping,
            Phase::Failed,
        ] {
            assert_eq!(Phase::from_u8(phase as u8), phase);
        }
    }
}
