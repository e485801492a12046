//! Two-stage diagnostic pipeline.
//!
//! The detector diagnoses a failure report; only when it reports a bug is
//! the fixer asked for a full-file fix. Each invocation walks the stages
//!
//! ```text
//! Start -> Detecting -> Detected (terminal)
//!                    -> FixPending -> Fixing -> Fixed (terminal)
//!                                            -> Failed (terminal)
//! ```
//!
//! and never moves backwards.

mod stage;

pub use stage::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::agents::{self, Agent};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::llm::ModelEndpoint;
use crate::prompts::{detection_json, detection_prompt, fix_prompt};
use crate::records::{DetectionRecord, FixRecord};

/// Message reported when the detector finds nothing to fix.
pub const NO_BUG_MESSAGE: &str = "No bug detected by the detector.";

/// Terminal outcome of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PipelineResult {
    /// The detector found no bug; the fixer was not consulted.
    Detected { detection: DetectionRecord },
    /// A bug was detected and the fixer proposed a fix.
    Fixed {
        detection: DetectionRecord,
        fix: FixRecord,
    },
}

impl PipelineResult {
    pub fn detection(&self) -> &DetectionRecord {
        match self {
            PipelineResult::Detected { detection } | PipelineResult::Fixed { detection, .. } => {
                detection
            }
        }
    }

    pub fn fix(&self) -> Option<&FixRecord> {
        match self {
            PipelineResult::Detected { .. } => None,
            PipelineResult::Fixed { fix, .. } => Some(fix),
        }
    }

    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineResult::Detected { .. } => PipelineStage::Detected,
            PipelineResult::Fixed { .. } => PipelineStage::Fixed,
        }
    }
}

/// Orchestrates a detector and a fixer agent.
///
/// Agents keep their histories across invocations, so repeated calls on
/// the same pipeline share context. Use one pipeline per concurrent task.
pub struct DiagnosticPipeline {
    detector: Agent,
    fixer: Agent,
    stage: PipelineStage,
}

impl DiagnosticPipeline {
    /// Create a pipeline from an already configured agent pair
    pub fn new(detector: Agent, fixer: Agent) -> Self {
        Self {
            detector,
            fixer,
            stage: PipelineStage::Start,
        }
    }

    /// Create a pipeline with fresh detector and fixer agents on `endpoint`
    pub fn from_config(endpoint: Arc<dyn ModelEndpoint>, config: &Config) -> Self {
        Self::new(
            agents::detector(endpoint.clone(), config),
            agents::fixer(endpoint, config),
        )
    }

    pub fn detector(&self) -> &Agent {
        &self.detector
    }

    pub fn fixer(&self) -> &Agent {
        &self.fixer
    }

    /// Stage reached by the most recent invocation.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Diagnose a failure report and, if it is a bug, propose a fix.
    pub async fn analyze_and_fix(
        &mut self,
        error_context: &str,
        code_snippet: Option<&str>,
        file_path_hint: Option<&str>,
    ) -> AppResult<PipelineResult> {
        if error_context.trim().is_empty() {
            return Err(AppError::Validation {
                field: "error_context".to_string(),
                reason: "Error context cannot be empty".to_string(),
            });
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);

        self.stage = PipelineStage::Start;
        let result = self
            .run(error_context, code_snippet, file_path_hint)
            .instrument(span)
            .await;

        if result.is_err() {
            self.advance(PipelineStage::Failed);
        }
        result
    }

    async fn run(
        &mut self,
        error_context: &str,
        code_snippet: Option<&str>,
        file_path_hint: Option<&str>,
    ) -> AppResult<PipelineResult> {
        self.advance(PipelineStage::Detecting);
        let prompt = detection_prompt(error_context, code_snippet, file_path_hint);
        let raw = self.detector.request_structured(&prompt).await?;
        let detection = DetectionRecord::from_structured(&raw)?.record;

        info!(
            bug_detected = detection.bug_detected,
            confidence = detection.confidence,
            file_path = %detection.file_path,
            "Detection complete"
        );

        if !detection.bug_detected {
            self.advance(PipelineStage::Detected);
            return Ok(PipelineResult::Detected { detection });
        }

        self.advance(PipelineStage::FixPending);
        let prompt = fix_prompt(&detection_json(&detection), code_snippet);

        self.advance(PipelineStage::Fixing);
        let raw = self.fixer.request_structured(&prompt).await?;
        let fix = FixRecord::from_structured(&raw)?;

        if fix.is_noop_for(code_snippet) {
            warn!(
                file_path = %fix.file_path,
                "Fixer proposed no change to the file content"
            );
        }

        self.advance(PipelineStage::Fixed);
        info!(
            file_path = %fix.file_path,
            new_content_bytes = fix.new_content.len(),
            suggestions = fix.test_suggestions.len(),
            "Fix proposed"
        );

        Ok(PipelineResult::Fixed { detection, fix })
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid pipeline transition {} -> {}",
            self.stage,
            next
        );
        info!(from = %self.stage, to = %next, "Pipeline stage transition");
        self.stage = next;
    }
}
