//! Boundary validation for board, column and task payloads.
//!
//! Request structs normalize themselves through a [`Validator`] before any
//! statement runs, so every failure is reported per field in one response.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Longest accepted name/title, matching the historical VARCHAR(255) limit.
pub const MAX_NAME_LENGTH: usize = 255;

pub const MIN_STORY_POINTS: i64 = 0;
pub const MAX_STORY_POINTS: i64 = 100;

/// Largest explicit position. Appends compute `MAX(position) + 1` in SQL,
/// which must stay inside SQLite's INTEGER range.
pub const MAX_POSITION: i64 = i32::MAX as i64;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field error found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Collects field errors while normalizing values.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Trim a required name/title. `label` is the human name, e.g. "Board name".
    pub fn required_text(&mut self, field: &str, label: &str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.reject(field, format!("{label} is required"));
        } else if trimmed.chars().count() > MAX_NAME_LENGTH {
            self.reject(
                field,
                format!("{label} must be at most {MAX_NAME_LENGTH} characters"),
            );
        }
        trimmed.to_string()
    }

    /// Trim free text; blank text becomes `None`.
    pub fn optional_text(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn color(&mut self, field: &str, value: &str) {
        if !is_hex_color(value) {
            self.reject(field, "Invalid color format");
        }
    }

    pub fn story_points(&mut self, field: &str, value: Option<i64>) {
        if let Some(points) = value
            && !(MIN_STORY_POINTS..=MAX_STORY_POINTS).contains(&points)
        {
            self.reject(
                field,
                format!("Story points must be between {MIN_STORY_POINTS} and {MAX_STORY_POINTS}"),
            );
        }
    }

    pub fn position(&mut self, field: &str, value: Option<i64>) {
        if let Some(position) = value
            && !(0..=MAX_POSITION).contains(&position)
        {
            self.reject(
                field,
                format!("Position must be between 0 and {MAX_POSITION}"),
            );
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}
