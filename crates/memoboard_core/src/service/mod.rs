//! Use-case services layered over repositories.
//!
//! # Responsibility
//! - Convert between storage records and transfer objects.
//! - Keep callers decoupled from join-record shapes.

pub mod board_service;
