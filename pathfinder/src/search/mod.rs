//! The search pipeline.
//!
//! A [`walker::CandidateWalker`] lazily yields files under the roots on a traversal
//! thread behind a [`feed::CandidateFeed`], a [`matcher::Matcher`] decides each one,
//! and an [`strategy::ExecutionStrategy`] drives the two, inline or on a worker pool.
//! Every accepted match passes through [`state::SearchState`], which deduplicates by
//! [`identity::FileIdentity`], enforces the result limit and idle timeout, and keeps
//! the call's statistics.

pub mod engine;
pub mod feed;
pub mod identity;
pub mod matcher;
pub mod processor;
pub mod state;
pub mod strategy;
pub mod walker;

pub use engine::{search, search_candidates};
pub use matcher::{MatchOptions, Matcher};
pub use strategy::{ExecutionStrategy, BATCH_SIZE};
pub use walker::{CandidateWalker, WalkOptions};
