//! Proposal domain model.

use super::note::NoteHistory;
use super::status::{CandidateResponse, CandidateSide, ProposalStatus, RejectionSide};
use crate::error::{MatchflowError, Result};
use crate::pair::{SuggestedPair, match_score_from};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A durable record that a specific pair has been put forward.
///
/// At most one Proposal exists per `(owner_id, boy_ref, girl_ref)`. A
/// Proposal is never physically deleted; closing it is a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Unique proposal identifier (UUID format)
    pub id: String,
    pub owner_id: String,
    pub boy_ref: String,
    pub girl_ref: String,
    /// Legacy 0.0-1.0 score, `final_score / 10`
    pub match_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpt_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<Vec<String>>,
    pub status: ProposalStatus,
    /// Single free-text note kept from before the note history existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes_history: NoteHistory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub boy_response: CandidateResponse,
    #[serde(default, deserialize_with = "null_as_default")]
    pub girl_response: CandidateResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_side: Option<RejectionSide>,
    /// Session the Proposal was promoted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Builds the initial record for a promoted pair.
    pub fn from_suggestion(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        pair: &SuggestedPair,
        original_session_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let final_score = pair.resolved_final_score();
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            boy_ref: pair.boy_ref.clone(),
            girl_ref: pair.girl_ref.clone(),
            match_score: match_score_from(final_score),
            logical_score: pair.logical_score,
            gpt_score: pair.gpt_score,
            final_score,
            summary: pair.summary.clone(),
            strengths: non_empty(&pair.strengths),
            concerns: non_empty(&pair.concerns),
            status: ProposalStatus::Approved,
            notes: None,
            notes_history: NoteHistory::new(),
            boy_response: CandidateResponse::Pending,
            girl_response: CandidateResponse::Pending,
            rejection_reason: None,
            rejection_side: None,
            original_session_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }

    pub fn response_of(&self, side: CandidateSide) -> CandidateResponse {
        match side {
            CandidateSide::Boy => self.boy_response,
            CandidateSide::Girl => self.girl_response,
        }
    }

    /// Moves the Proposal to `new_status`, recording `note` in the history.
    ///
    /// The note is mandatory. Entering the rejection family stores the note
    /// as the rejection reason. Terminal Proposals accept no status change.
    pub fn change_status(&mut self, new_status: ProposalStatus, note: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(MatchflowError::InvalidTransition {
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }
        let reason = note.trim();
        if reason.is_empty() {
            return Err(MatchflowError::validation(format!(
                "A note is required when moving a proposal to '{}'",
                new_status
            )));
        }

        self.notes_history.append(reason, Some(new_status))?;

        match new_status {
            ProposalStatus::Rejected => {
                self.rejection_reason = Some(reason.to_string());
                self.rejection_side = Some(RejectionSide::Operator);
            }
            ProposalStatus::RejectedByCandidate => {
                self.rejection_reason = Some(reason.to_string());
                self.rejection_side = Some(match self.rejection_side {
                    Some(side @ (RejectionSide::Boy | RejectionSide::Girl | RejectionSide::Both)) => {
                        side
                    }
                    Some(RejectionSide::Operator) | None => RejectionSide::Both,
                });
            }
            ProposalStatus::Pending
            | ProposalStatus::Approved
            | ProposalStatus::ReadyForProcessing
            | ProposalStatus::ReadyForContact
            | ProposalStatus::Contacting
            | ProposalStatus::AwaitingResponse
            | ProposalStatus::ScheduleMeeting
            | ProposalStatus::MeetingScheduled
            | ProposalStatus::InMeetingProcess
            | ProposalStatus::MeetingCompleted
            | ProposalStatus::Completed
            | ProposalStatus::Closed => {}
        }

        self.status = new_status;
        Ok(())
    }

    /// Records one candidate's response.
    ///
    /// `NotInterested` requires a reason, which becomes the rejection reason.
    /// The status is left alone; advancing it is a separate operator action.
    pub fn record_response(
        &mut self,
        side: CandidateSide,
        response: CandidateResponse,
        reason: Option<&str>,
    ) -> Result<()> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        if response.is_rejection() {
            let reason = reason.ok_or_else(|| {
                MatchflowError::validation(format!(
                    "A reason is required when the {} side is not interested",
                    side
                ))
            })?;
            self.rejection_reason = Some(reason.to_string());
            self.rejection_side = Some(RejectionSide::merge(self.rejection_side, side));
        }

        match side {
            CandidateSide::Boy => self.boy_response = response,
            CandidateSide::Girl => self.girl_response = response,
        }
        Ok(())
    }
}

/// Stored rows may carry an explicit `null` for fields written before they existed.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}
