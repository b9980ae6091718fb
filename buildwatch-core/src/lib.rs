//! Buildwatch Core
//!
//! Core types and abstractions for watching a buildbot master.
//!
//! This crate contains:
//! - Domain types: Tracked builders and the events emitted about them
//! - DTOs: The persisted snapshot format and the status API payloads

pub mod domain;
pub mod dto;
