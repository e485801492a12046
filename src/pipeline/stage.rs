use serde::{Deserialize, Serialize};

/// Position of a pipeline invocation in its linear state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Start,
    /// Waiting on the detector.
    Detecting,
    /// Terminal: no bug, fixer skipped.
    Detected,
    FixPending,
    /// Waiting on the fixer.
    Fixing,
    /// Terminal: fix proposed.
    Fixed,
    /// Terminal: an error ended the invocation.
    Failed,
}

impl PipelineStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Start => "start",
            PipelineStage::Detecting => "detecting",
            PipelineStage::Detected => "detected",
            PipelineStage::FixPending => "fix_pending",
            PipelineStage::Fixing => "fixing",
            PipelineStage::Fixed => "fixed",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Detected | PipelineStage::Fixed | PipelineStage::Failed
        )
    }

    /// Whether `next` directly follows this stage.
    ///
    /// Only the two model-call stages can fail.
    pub fn can_advance_to(&self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Start, Detecting)
                | (Detecting, Detected)
                | (Detecting, FixPending)
                | (Detecting, Failed)
                | (FixPending, Fixing)
                | (Fixing, Fixed)
                | (Fixing, Failed)
        )
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
