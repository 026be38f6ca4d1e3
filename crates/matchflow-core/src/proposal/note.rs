//! Proposal note history.

use super::status::ProposalStatus;
use crate::error::{MatchflowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One operator annotation on a Proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    /// Status recorded together with the note, when written by a status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_at_time: Option<ProposalStatus>,
}

impl Note {
    pub fn new(content: impl Into<String>, status_at_time: Option<ProposalStatus>) -> Self {
        Self {
            content: content.into(),
            created_at: Utc::now(),
            edited_at: None,
            status_at_time,
        }
    }
}

/// Append-only note list with positional edit and delete.
///
/// Edits never reorder entries. Every operation checks its input before
/// touching the list, so a failed call leaves the history unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteHistory(Vec<Note>);

impl NoteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&Note> {
        self.0.last()
    }

    /// Appends a note; empty content is rejected.
    pub fn append(&mut self, content: &str, status_at_time: Option<ProposalStatus>) -> Result<()> {
        let content = require_content(content)?;
        self.0.push(Note::new(content, status_at_time));
        Ok(())
    }

    /// Rewrites the content of the note at `index` and stamps `edited_at`.
    pub fn edit(&mut self, index: usize, content: &str) -> Result<()> {
        self.check_index(index)?;
        let content = require_content(content)?;
        let note = &mut self.0[index];
        note.content = content;
        note.edited_at = Some(Utc::now());
        Ok(())
    }

    /// Removes exactly the note at `index`, shifting later notes down.
    pub fn remove(&mut self, index: usize) -> Result<Note> {
        self.check_index(index)?;
        Ok(self.0.remove(index))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.0.len() {
            return Err(MatchflowError::OutOfRange {
                index,
                len: self.0.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<Note>> for NoteHistory {
    fn from(notes: Vec<Note>) -> Self {
        Self(notes)
    }
}

fn require_content(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(MatchflowError::validation("Note content must not be empty"));
    }
    Ok(trimmed.to_string())
}
