use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Lifecycle of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestState {
    Idle,
    Running {
        #[serde(skip)]
        start_time: Option<Instant>,
        collectors: usize,
    },
    /// Sorting channels after an out-of-order multi-collector run
    Repairing,
    Completed {
        #[serde(skip)]
        duration: Option<Duration>,
        samples_filed: u64,
    },
    Failed {
        error_msg: String,
    },
}

impl IngestState {
    pub fn can_transition_to(&self, target: &IngestState) -> bool {
        use IngestState::*;

        matches!(
            (self, target),
            (Idle, Running { .. }) |

            (Running { .. }, Repairing) |
            (Running { .. }, Completed { .. }) |
            (Running { .. }, Failed { .. }) |

            (Repairing, Completed { .. }) |
            (Repairing, Failed { .. }) |

            (Completed { .. }, Idle) |
            (Failed { .. }, Idle)
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Repairing => "Repairing",
            Self::Completed { .. } => "Completed",
            Self::Failed { .. } => "Failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

impl Default for IngestState {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let idle = IngestState::Idle;
        let running = IngestState::Running {
            start_time: None,
            collectors: 1,
        };

        assert!(idle.can_transition_to(&running));
        assert!(!running.can_transition_to(&idle));
        assert!(running.can_transition_to(&IngestState::Repairing));
    }

    #[test]
    fn test_idle_cannot_skip_to_completed() {
        let completed = IngestState::Completed {
            duration: None,
            samples_filed: 0,
        };
        assert!(!IngestState::Idle.can_transition_to(&completed));
        assert!(completed.can_transition_to(&IngestState::Idle));
    }

    #[test]
    fn test_failed_resets_to_idle() {
        let failed = IngestState::Failed {
            error_msg: "consumer gone".to_string(),
        };
        assert!(failed.is_finished());
        assert!(failed.can_transition_to(&IngestState::Idle));
        assert!(!failed.can_transition_to(&IngestState::Repairing));
    }
}
