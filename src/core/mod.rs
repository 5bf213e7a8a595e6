//! Core types for Kalike.
//!
//! This module contains the learner session: the context object that binds
//! one principal's expertise engine to the store its stats persist in.

pub mod session;

pub use session::{LearnerSession, Principal};
