//! Proposal status and candidate response types.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Where a Proposal stands in the courtship pipeline.
///
/// Transitions are not strictly ordered: the operator may move a Proposal
/// from any non-terminal state to any other. `Completed` and `Closed` are
/// terminal. Entering the rejection family requires a reason.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    /// Initial state of a freshly promoted Proposal.
    Approved,
    ReadyForProcessing,
    ReadyForContact,
    Contacting,
    AwaitingResponse,
    ScheduleMeeting,
    MeetingScheduled,
    InMeetingProcess,
    MeetingCompleted,
    Completed,
    /// Rejected by the operator.
    Rejected,
    /// Rejected by one or both candidates.
    RejectedByCandidate,
    Closed,
}

impl ProposalStatus {
    /// No further transitions are modeled out of these states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Closed)
    }

    /// States that must be accompanied by a rejection reason.
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::Rejected | Self::RejectedByCandidate)
    }
}

/// A candidate's reaction to a Proposal.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CandidateResponse {
    #[default]
    Pending,
    Interested,
    NotInterested,
    NeedsTime,
}

impl CandidateResponse {
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::NotInterested)
    }
}

/// Which candidate a response belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CandidateSide {
    Boy,
    Girl,
}

/// Who turned a Proposal down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectionSide {
    Boy,
    Girl,
    Both,
    Operator,
}

impl From<CandidateSide> for RejectionSide {
    fn from(side: CandidateSide) -> Self {
        match side {
            CandidateSide::Boy => Self::Boy,
            CandidateSide::Girl => Self::Girl,
        }
    }
}

impl RejectionSide {
    /// Combines an existing rejection side with a new candidate rejection.
    pub fn merge(existing: Option<Self>, side: CandidateSide) -> Self {
        match (existing, side) {
            (Some(Self::Both), _) => Self::Both,
            (Some(Self::Boy), CandidateSide::Girl) | (Some(Self::Girl), CandidateSide::Boy) => {
                Self::Both
            }
            (_, side) => side.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_terminal_and_rejection_families() {
        let terminal: Vec<_> = ProposalStatus::iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![ProposalStatus::Completed, ProposalStatus::Closed]);

        let rejections: Vec<_> = ProposalStatus::iter().filter(|s| s.is_rejection()).collect();
        assert_eq!(
            rejections,
            vec![ProposalStatus::Rejected, ProposalStatus::RejectedByCandidate]
        );
    }

    #[test]
    fn test_status_string_round_trip() {
        assert_eq!(
            ProposalStatus::from_str("rejected_by_candidate").unwrap(),
            ProposalStatus::RejectedByCandidate
        );
        assert_eq!(ProposalStatus::InMeetingProcess.to_string(), "in_meeting_process");
        assert!(ProposalStatus::from_str("on_hold").is_err());
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&ProposalStatus::ReadyForContact).unwrap();
        assert_eq!(json, "\"ready_for_contact\"");
        let response: CandidateResponse = serde_json::from_str("\"needs_time\"").unwrap();
        assert_eq!(response, CandidateResponse::NeedsTime);
    }

    #[test]
    fn test_rejection_side_merge() {
        assert_eq!(RejectionSide::merge(None, CandidateSide::Boy), RejectionSide::Boy);
        assert_eq!(
            RejectionSide::merge(Some(RejectionSide::Boy), CandidateSide::Girl),
            RejectionSide::Both
        );
        assert_eq!(
            RejectionSide::merge(Some(RejectionSide::Girl), CandidateSide::Girl),
            RejectionSide::Girl
        );
        assert_eq!(
            RejectionSide::merge(Some(RejectionSide::Operator), CandidateSide::Girl),
            RejectionSide::Girl
        );
    }
}
