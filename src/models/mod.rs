//! Data models for the Chirp client.
//!
//! These models match the post service's JSON contract (camelCase fields).

mod post;

pub use post::*;
