//! Board, column and task models.
//!
//! Columns and tasks are ordered by an integer `position` within their parent
//! scope; see [`position`] for how new sort keys are assigned.

use serde::{Deserialize, Deserializer};

pub mod board;
pub mod column;
pub mod position;
pub mod task;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
