//! Command synthesis.
//!
//! Turns structured build options into shell command strings for the target
//! platform's compiler and for Cython. Everything here is a pure function of
//! its inputs: nothing touches the filesystem and nothing is spawned.

mod cc;
mod cython;
pub mod path;
pub mod types;

pub use cc::{compile_command, resolve_front_end};
pub use cython::{cython_chain, cython_command};
pub use path::{normalize_path, normalize_paths};
pub use types::{
    CompileOptions, CythonOptions, CythonPlan, Embed, Language, LanguageLevel, SynthError,
    Toolchain,
};
