//! Journal entry form state, independent of any UI toolkit.

use crate::journal::{SaveJournalRequest, SaveJournalResponse};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please write something before saving.")]
    EmptyText,

    #[error("Choose at least one place to save the entry.")]
    NoDestination,

    #[error("A save is already in progress.")]
    AlreadySubmitting
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntryForm {
    pub text: String,
    pub mood: String,
    /// Comma-separated, as typed.
    pub tags: String,
    pub save_to_notion: bool,
    pub save_to_qdrant: bool,
    submitting: bool,
    error: Option<String>
}

impl Default for JournalEntryForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            mood: String::new(),
            tags: String::new(),
            save_to_notion: true,
            save_to_qdrant: true,
            submitting: false,
            error: None
        }
    }
}

impl JournalEntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Last error to display, verbatim.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.text.trim().is_empty() {
            return Err(FormError::EmptyText);
        }
        if !self.save_to_notion && !self.save_to_qdrant {
            return Err(FormError::NoDestination);
        }
        Ok(())
    }

    pub fn to_request(&self) -> SaveJournalRequest {
        let mood = self.mood.trim();
        SaveJournalRequest {
            text: self.text.clone(),
            mood: (!mood.is_empty()).then(|| mood.to_string()),
            tags: parse_tags(&self.tags),
            entry_timestamp: None,
            save_to_notion: self.save_to_notion,
            save_to_qdrant: self.save_to_qdrant
        }
    }

    /// Validates and marks the form as submitting. The returned request is
    /// what should be sent.
    pub fn begin_submit(&mut self) -> Result<SaveJournalRequest, FormError> {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        if let Err(e) = self.validate() {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.submitting = true;
        self.error = None;
        Ok(self.to_request())
    }

    /// Applies the server's answer. On success the entry fields are cleared
    /// (destination toggles are kept) and `on_saved` receives
    /// `(source_id, reflection)`.
    pub fn apply_response<F>(&mut self, response: SaveJournalResponse, on_saved: F)
    where
        F: FnOnce(Option<String>, Option<String>)
    {
        self.submitting = false;
        if response.success {
            self.text.clear();
            self.mood.clear();
            self.tags.clear();
            self.error = None;
            on_saved(response.source_id, response.reflection);
        } else {
            self.error = Some(
                response
                    .error
                    .unwrap_or_else(|| "Failed to save journal entry.".to_string())
            );
        }
    }
}

/// Splits on commas, trims, and drops empty pieces.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
