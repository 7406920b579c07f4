//! Driver for the Death & Taxes blurb bot.
//!
//! Reads the account's recent posts, finds a freshly spoiled white card that
//! has not been covered yet, and posts a generated caption with one image
//! and alt text per card face.

pub mod catalog;
pub mod config;
pub mod history;
pub mod job;
pub mod logging;
pub mod schedule;
pub mod social;
