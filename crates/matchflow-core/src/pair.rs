//! Suggested pair model.
//!
//! A `SuggestedPair` is one row of a review batch: the scoring pipeline's
//! suggestion that a boy and a girl candidate may fit, plus the operator's
//! review outcome. It is not a persisted Proposal yet.
//!
//! External input has used two names for the candidate references over time
//! (`boyRef`/`girlRef` and the older `maleId`/`femaleId`). Normalization happens
//! once, when the pair is deserialized, so the rest of the engine only ever
//! sees the canonical fields.

use crate::error::{MatchflowError, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lowest accepted logical score.
pub const LOGICAL_SCORE_MIN: f64 = 0.0;
/// Lowest accepted external model score.
pub const GPT_SCORE_MIN: f64 = 1.0;
/// Highest accepted score on either scale.
pub const SCORE_MAX: f64 = 10.0;

/// Operator review outcome for a suggested pair.
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
pub enum ReviewStatus {
    /// Not reviewed yet.
    #[default]
    Pending,
    /// Accepted by the operator; normally promoted to a Proposal.
    Approved,
    /// Dismissed by the operator.
    Rejected,
    /// Looked at and deliberately left for later.
    Skipped,
}

impl ReviewStatus {
    /// Returns true once the operator has made any decision on the pair.
    pub fn is_processed(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Canonical suggested pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawSuggestedPair")]
pub struct SuggestedPair {
    pub boy_ref: String,
    pub girl_ref: String,
    /// Rule-based score, 0 to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_score: Option<f64>,
    /// Score returned by the external text-generation service, 1 to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpt_score: Option<f64>,
    /// Explicit final score; derived from the other two when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    /// Proposal created from this pair, once promoted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
}

/// Wire shape accepted from callers before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSuggestedPair {
    #[serde(default)]
    pub boy_ref: Option<String>,
    #[serde(default)]
    pub girl_ref: Option<String>,
    #[serde(default)]
    pub male_id: Option<String>,
    #[serde(default)]
    pub female_id: Option<String>,
    #[serde(default)]
    pub logical_score: Option<f64>,
    #[serde(default)]
    pub gpt_score: Option<f64>,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub proposal_id: Option<String>,
}

fn pick_reference(canonical: Option<String>, legacy: Option<String>) -> Option<String> {
    canonical
        .filter(|value| !value.trim().is_empty())
        .or_else(|| legacy.filter(|value| !value.trim().is_empty()))
}

impl TryFrom<RawSuggestedPair> for SuggestedPair {
    type Error = MatchflowError;

    fn try_from(raw: RawSuggestedPair) -> Result<Self> {
        let boy_ref = pick_reference(raw.boy_ref, raw.male_id)
            .ok_or_else(|| MatchflowError::validation("Suggested pair is missing boyRef"))?;
        let girl_ref = pick_reference(raw.girl_ref, raw.female_id)
            .ok_or_else(|| MatchflowError::validation("Suggested pair is missing girlRef"))?;

        Ok(Self {
            boy_ref,
            girl_ref,
            logical_score: raw.logical_score,
            gpt_score: raw.gpt_score,
            final_score: raw.final_score,
            summary: raw.summary,
            strengths: raw.strengths,
            concerns: raw.concerns,
            status: raw.status,
            proposal_id: raw.proposal_id,
        })
    }
}

impl SuggestedPair {
    /// Creates an unscored, pending pair.
    pub fn new(boy_ref: impl Into<String>, girl_ref: impl Into<String>) -> Self {
        Self {
            boy_ref: boy_ref.into(),
            girl_ref: girl_ref.into(),
            logical_score: None,
            gpt_score: None,
            final_score: None,
            summary: None,
            strengths: Vec::new(),
            concerns: Vec::new(),
            status: ReviewStatus::Pending,
            proposal_id: None,
        }
    }

    pub fn with_scores(mut self, logical_score: Option<f64>, gpt_score: Option<f64>) -> Self {
        self.logical_score = logical_score;
        self.gpt_score = gpt_score;
        self
    }

    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks the candidate references and score ranges.
    pub fn validate(&self) -> Result<()> {
        if self.boy_ref.trim().is_empty() || self.girl_ref.trim().is_empty() {
            return Err(MatchflowError::validation(
                "Both candidate references are required",
            ));
        }
        check_range("logicalScore", self.logical_score, LOGICAL_SCORE_MIN)?;
        check_range("gptScore", self.gpt_score, GPT_SCORE_MIN)?;
        check_range("finalScore", self.final_score, LOGICAL_SCORE_MIN)?;
        Ok(())
    }

    /// Final score: the explicit value, else the mean of whatever scores exist.
    pub fn resolved_final_score(&self) -> Option<f64> {
        if self.final_score.is_some() {
            return self.final_score;
        }
        match (self.logical_score, self.gpt_score) {
            (Some(logical), Some(gpt)) => Some((logical + gpt) / 2.0),
            (Some(score), None) | (None, Some(score)) => Some(score),
            (None, None) => None,
        }
    }
}

/// Legacy 0.0-1.0 match score derived from a 0-10 final score.
pub fn match_score_from(final_score: Option<f64>) -> f64 {
    final_score
        .map(|score| (score / SCORE_MAX).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

fn check_range(field: &str, value: Option<f64>, min: f64) -> Result<()> {
    match value {
        Some(score) if !(min..=SCORE_MAX).contains(&score) => Err(MatchflowError::validation(
            format!("{} must be between {} and {}, got {}", field, min, SCORE_MAX, score),
        )),
        _ => Ok(()),
    }
}
