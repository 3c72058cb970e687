//! Core types and trait definitions for Roster, a staff scheduling and
//! task-tracking backend.
//!
//! No HTTP or database code lives here. Every other crate in the workspace
//! depends on this one.

// Store implementations use native `async fn` for the trait's methods.
#![allow(async_fn_in_trait)]

pub mod calendar;
pub mod error;
pub mod meeting;
pub mod person;
pub mod store;
pub mod task;

pub use error::{DomainError, Entity, Error, Result};
