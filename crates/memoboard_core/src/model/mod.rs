//! Domain records for memo and board storage.
//!
//! # Responsibility
//! - Define the row shapes returned by repositories.
//! - Own write-side validation rules that run before any SQL.
//! - Define paging/sorting request and result envelopes.

pub mod board;
pub mod memo;
pub mod page;
