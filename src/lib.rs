//! Ariane - A GitHub bot that dispatches CI workflows from pull request comments.
//!
//! A comment matching a configured trigger phrase starts the trigger's
//! workflows on the PR, skipping those the PR's changes don't touch and those
//! that already passed on the head commit. Merge queue groups get their
//! app-agnostic required checks reported as passed.

pub mod config;
pub mod decision;
pub mod effects;
pub mod github;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
