//! Pipeline run state machine.
//!
//! ```text
//! Idle → Specifying → Designing → Researching → Filing → Done
//!            │            │            │           │
//!            └────────────┴─────┬──────┴───────────┘
//!                               ▼
//!                         Failed(stage)
//! ```
//!
//! Transitions are sequential and unconditional on success. There is no skip,
//! retry, or backward transition.

use std::fmt;

use pipeline::Stage;

/// Where a single pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Specifying,
    Designing,
    Researching,
    Filing,
    Done,
    /// Terminal failure, tagged with the stage that was executing.
    Failed(Stage),
}

impl PipelineState {
    /// The stage executing in this state, if any.
    pub fn stage(self) -> Option<Stage> {
        match self {
            Self::Specifying => Some(Stage::Specify),
            Self::Designing => Some(Stage::Design),
            Self::Researching => Some(Stage::Research),
            Self::Filing => Some(Stage::File),
            Self::Idle | Self::Done | Self::Failed(_) => None,
        }
    }

    /// The state entered when the current one completes successfully.
    ///
    /// Terminal states are returned unchanged.
    #[must_use]
    pub fn advance(self) -> Self {
        match self {
            Self::Idle => Self::Specifying,
            Self::Specifying => Self::Designing,
            Self::Designing => Self::Researching,
            Self::Researching => Self::Filing,
            Self::Filing => Self::Done,
            terminal @ (Self::Done | Self::Failed(_)) => terminal,
        }
    }

    /// The state entered when the current stage fails.
    ///
    /// Only states with an executing stage can fail; `Idle` and terminal
    /// states are returned unchanged.
    #[must_use]
    pub fn fail(self) -> Self {
        match self.stage() {
            Some(stage) => Self::Failed(stage),
            None => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Specifying => f.write_str("specifying"),
            Self::Designing => f.write_str("designing"),
            Self::Researching => f.write_str("researching"),
            Self::Filing => f.write_str("filing"),
            Self::Done => f.write_str("done"),
            Self::Failed(stage) => write!(f, "failed({stage})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_visits_every_state_in_order() {
        let mut state = PipelineState::Idle;
        let mut visited = vec![state];
        while !state.is_terminal() {
            state = state.advance();
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                PipelineState::Idle,
                PipelineState::Specifying,
                PipelineState::Designing,
                PipelineState::Researching,
                PipelineState::Filing,
                PipelineState::Done,
            ]
        );
    }

    #[test]
    fn test_failure_is_tagged_with_executing_stage() {
        assert_eq!(
            PipelineState::Specifying.fail(),
            PipelineState::Failed(Stage::Specify)
        );
        assert_eq!(
            PipelineState::Filing.fail(),
            PipelineState::Failed(Stage::File)
        );
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        let failed = PipelineState::Failed(Stage::Design);
        assert_eq!(failed.advance(), failed);
        assert_eq!(failed.fail(), failed);
        assert_eq!(PipelineState::Done.advance(), PipelineState::Done);
        assert_eq!(PipelineState::Idle.fail(), PipelineState::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(PipelineState::Researching.to_string(), "researching");
        assert_eq!(
            PipelineState::Failed(Stage::Research).to_string(),
            "failed(research)"
        );
    }
}
