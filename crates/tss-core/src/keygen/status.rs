//! Group-level DKG status

use serde::{Deserialize, Serialize};

use crate::GroupConfig;

/// Sub-state of round 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round3Phase {
    /// Collecting own-public-key confirmations
    Confirming,
    /// At least one complaint was filed and is being judged
    Complaining,
}

/// Where a group stands in the DKG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DkgStatus {
    Round1,
    Round2,
    Round3(Round3Phase),
    Active,
    Failed,
}

/// What the orchestrator collected when a round closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Members whose submission passed verification. While complaints are
    /// judged, only confirmations from members not found misbehaving count.
    pub valid_submissions: usize,
    /// Complaints filed in round 3 that are still open
    pub complaints: usize,
}

impl DkgStatus {
    /// Move to the next status once the current round has closed
    ///
    /// Every round needs [`GroupConfig::quorum`] valid submissions. A round 3
    /// with complaints first moves to [`Round3Phase::Complaining`]; it then
    /// activates once every complaint is resolved and the remaining
    /// confirmations still reach the quorum.
    pub fn advance(self, config: &GroupConfig, report: &RoundReport) -> DkgStatus {
        let quorum = report.valid_submissions >= config.quorum();
        match self {
            DkgStatus::Round1 if quorum => DkgStatus::Round2,
            DkgStatus::Round2 if quorum => DkgStatus::Round3(Round3Phase::Confirming),
            DkgStatus::Round3(Round3Phase::Confirming) if report.complaints > 0 => {
                DkgStatus::Round3(Round3Phase::Complaining)
            }
            DkgStatus::Round3(_) if quorum && report.complaints == 0 => DkgStatus::Active,
            DkgStatus::Round1 | DkgStatus::Round2 | DkgStatus::Round3(_) => DkgStatus::Failed,
            DkgStatus::Active | DkgStatus::Failed => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DkgStatus::Active | DkgStatus::Failed)
    }
}
