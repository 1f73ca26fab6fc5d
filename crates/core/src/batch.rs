//! Lifecycle of a single batch invocation.
//!
//! ```text
//! Created -> Submitting -> Polling -> Aggregating -> WritingBack -> Done
//!    |            |            |            |              |
//!    +------------+------------+------------+--------------+--> Failed
//! ```

use serde::Serialize;

/// Phase of one batch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Created,
    Submitting,
    Polling,
    Aggregating,
    WritingBack,
    /// Finished; may still represent a partial success.
    Done,
    /// A precondition was missing, nothing succeeded, or writeback failed.
    Failed,
}

impl BatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPhase::Created => "created",
            BatchPhase::Submitting => "submitting",
            BatchPhase::Polling => "polling",
            BatchPhase::Aggregating => "aggregating",
            BatchPhase::WritingBack => "writing_back",
            BatchPhase::Done => "done",
            BatchPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchPhase::Done | BatchPhase::Failed)
    }

    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(&self, next: BatchPhase) -> bool {
        use BatchPhase::*;
        match (self, next) {
            (Created, Submitting)
            | (Submitting, Polling)
            | (Polling, Aggregating)
            | (Aggregating, WritingBack)
            | (WritingBack, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_legal() {
        let path = [
            BatchPhase::Created,
            BatchPhase::Submitting,
            BatchPhase::Polling,
            BatchPhase::Aggregating,
            BatchPhase::WritingBack,
            BatchPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn any_active_phase_can_fail() {
        for phase in [
            BatchPhase::Created,
            BatchPhase::Submitting,
            BatchPhase::Polling,
            BatchPhase::Aggregating,
            BatchPhase::WritingBack,
        ] {
            assert!(phase.can_transition_to(BatchPhase::Failed));
        }
    }

    #[test]
    fn terminal_phases_are_final() {
        assert!(!BatchPhase::Done.can_transition_to(BatchPhase::Failed));
        assert!(!BatchPhase::Failed.can_transition_to(BatchPhase::Created));
        assert!(BatchPhase::Done.is_terminal());
    }

    #[test]
    fn phases_cannot_be_skipped() {
        assert!(!BatchPhase::Created.can_transition_to(BatchPhase::Polling));
        assert!(!BatchPhase::Polling.can_transition_to(BatchPhase::WritingBack));
    }
}
