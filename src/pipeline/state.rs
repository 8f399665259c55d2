/// Where the pipeline is. `Failed` is only ever passed through on the way
/// back to `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Ingesting,
    AwaitingPrediction,
    Displaying,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Ingesting => "Ingesting",
            PipelineState::AwaitingPrediction => "AwaitingPrediction",
            PipelineState::Displaying => "Displaying",
            PipelineState::Failed => "Failed",
        }
    }

    /// Only one run may be in flight; a file is accepted from rest states only.
    pub fn accepts_file(&self) -> bool {
        matches!(self, PipelineState::Idle | PipelineState::Displaying)
    }

    /// A run is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Ingesting | PipelineState::AwaitingPrediction
        )
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_file() {
        assert!(PipelineState::Idle.accepts_file());
        assert!(PipelineState::Displaying.accepts_file());
        assert!(!PipelineState::Ingesting.accepts_file());
        assert!(!PipelineState::AwaitingPrediction.accepts_file());
        assert!(!PipelineState::Failed.accepts_file());
        assert_eq!(PipelineState::default(), PipelineState::Idle);
    }

    #[test]
    fn test_is_busy() {
        assert!(PipelineState::Ingesting.is_busy());
        assert!(PipelineState::AwaitingPrediction.is_busy());
        assert!(!PipelineState::Idle.is_busy());
        assert!(!PipelineState::Displaying.is_busy());
        assert!(!PipelineState::Failed.is_busy());
    }
}
