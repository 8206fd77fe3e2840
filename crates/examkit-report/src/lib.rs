//! examkit-report: Results views for submitted attempts.
//!
//! Renders an [`AttemptRecord`](examkit_core::model::AttemptRecord) as a
//! self-contained HTML page or as markdown.

pub mod html;
pub mod markdown;

#[cfg(test)]
pub(crate) mod fixtures;
