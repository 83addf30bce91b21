//! # scribed-core
//!
//! Foundation crate for the scribed transcription daemon.
//!
//! Provides the shared vocabulary the other scribed crates depend on:
//!
//! - **Errors**: [`errors::TranscribeError`] — the closed failure
//!   enumeration carried from the pipeline to the HTTP boundary
//! - **Constants**: [`constants`] — fixed model, chunking, and sampling
//!   configuration
//! - **Logging**: [`logging::init_tracing`] — tracing subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other scribed crates.

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod logging;

pub use errors::{ResultExt, TranscribeError};
