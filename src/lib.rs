//! # ph - Project Helper
//!
//! A small build orchestrator for Cython projects. A `project.ph` script
//! (rhai) declares metadata and options, then registers *chains*: ordered
//! shell commands. Steps within a chain run one after another; separate
//! chains run as concurrent child processes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the project's declared options
//! ph
//!
//! # Run the project's build with options
//! ph --build --mode:release
//! ```
//!
//! ## Module Organization
//!
//! - [`synth`] - Cython/C command synthesis and path normalization
//! - [`scheduler`] - Concurrent chain execution
//! - [`project`] - Script loading and the build API exposed to it
//! - [`platform`] - Target platform table

/// Command-line token parsing.
pub mod cli;

/// Settings file parsing (`ph.toml`).
pub mod config;

/// Glob matching and file deletion.
pub mod files;

/// Target platforms and their extensions, separators and front ends.
pub mod platform;

/// Project scripts and the build API.
pub mod project;

/// Chain registration and concurrent execution.
pub mod scheduler;

/// Build command synthesis.
pub mod synth;

/// Terminal output (prefixed log lines, progress, tables).
pub mod ui;
