//! examkit-core: Exam model, scoring, and attempt session logic.
//!
//! This crate defines the data model, the collaborator traits for exam
//! lookup and result storage, and the pieces an attempt is built from:
//! answer tracking, the countdown, navigation, scoring, and persistence.

pub mod accessor;
pub mod answers;
pub mod cache;
pub mod countdown;
pub mod error;
pub mod model;
pub mod navigation;
pub mod parser;
pub mod persister;
pub mod scoring;
pub mod session;
pub mod traits;
