//! Service modules for Task Tiles.
//!
//! - [`config`] - environment configuration shared by every crate
//! - [`assist`] - text-generation assist behind `POST /api/ai/generate`

pub mod assist;
pub mod config;
