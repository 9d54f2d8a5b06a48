//! # bl-core
//!
//! Core types, traits, and utilities for Backlog RS.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - The error taxonomy (`BlError`, `ValidationErrors`)
//! - Result type alias (`BlResult`)
//! - Core entity traits (Entity, Identifiable, Timestamped)
//! - Application configuration and tracing initialisation

pub mod config;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod traits;

pub use error::*;
pub use result::*;
pub use traits::*;
