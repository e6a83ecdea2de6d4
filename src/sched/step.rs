// src/sched/step.rs

//! Result types for a single scheduler commit.

use crate::dag::VertexId;
use crate::errors::DagrunError;

/// How a campaign ended.
#[derive(Debug)]
pub enum CampaignOutcome {
    /// Every vertex reached `Success`.
    Success,
    /// One or more vertices failed; the error carries the failing ids.
    Failed(DagrunError),
}

impl CampaignOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CampaignOutcome::Success)
    }
}

/// Structured result of a single scheduler commit.
///
/// Callers drive the campaign by executing `started` vertices and treating a
/// populated `outcome` as the (at-most-once) terminal signal.
#[derive(Debug, Default)]
pub struct SchedulerStep {
    /// Vertices moved to in-progress by this commit, in dispatch order.
    pub started: Vec<VertexId>,
    /// Terminal campaign outcome, when this commit ended the campaign.
    pub outcome: Option<CampaignOutcome>,
}
