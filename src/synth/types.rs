use crate::platform::{Platform, PythonPaths};
use std::collections::BTreeMap;

/// Source language of a C compile step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    C,
    Cxx,
}

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "c" => Some(Language::C),
            "c++" | "cpp" | "cxx" => Some(Language::Cxx),
            _ => None,
        }
    }
}

/// Options for a single C/C++ compile-and-link invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub source: String,
    pub output: String,
    pub includes: Vec<String>,
    pub libraries: Vec<String>,
    pub library_dirs: Vec<String>,
    pub language: Language,
    /// Build a shared library instead of an executable
    pub shared: bool,
}

/// How `--embed` is passed to Cython.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Embed {
    #[default]
    Off,
    /// Generate a `main()` entry point
    Main,
    /// Generate an entry point with the given name
    Named(String),
}

impl Embed {
    pub fn is_on(&self) -> bool {
        !matches!(self, Embed::Off)
    }
}

/// Python language level of the Cython source (`-2` / `-3`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LanguageLevel {
    #[default]
    Default,
    Python2,
    Python3,
}

/// Options for a Cython transpile-then-compile chain.
///
/// Field order here is irrelevant to the command line: switches are always
/// emitted in the canonical order of [`super::cython_command`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CythonOptions {
    pub source: String,
    /// Artifact name; defaults to the source's base name
    pub output: Option<String>,
    pub include_dirs: Vec<String>,
    pub directives: BTreeMap<String, String>,
    pub timestamps: bool,
    pub force: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub embed_positions: bool,
    pub cleanup: Option<u32>,
    pub gdb: bool,
    pub no_docstrings: bool,
    pub annotate: bool,
    pub line_directives: bool,
    pub cplus: bool,
    pub embed: Embed,
    pub language_level: LanguageLevel,
    pub fast_fail: bool,
    pub warning_errors: bool,
    pub warning_extra: bool,
}

impl CythonOptions {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Everything the synthesizer knows about the target: the platform record
/// plus whatever the user overrode in `ph.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub platform: Platform,
    /// Explicit compiler command, replaces the platform's front end
    pub cc: Option<String>,
    pub cython: String,
    pub python: PythonPaths,
}

impl Toolchain {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            cc: None,
            cython: "cython".to_string(),
            python: platform.python(),
        }
    }
}

/// Result of synthesizing a Cython chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CythonPlan {
    /// File name of the generated C/C++ source
    pub intermediate: String,
    /// File name of the compiled module or executable
    pub artifact: String,
    /// Transpile step followed by the compile step
    pub steps: Vec<String>,
}

/// Error type for command synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// No compiler front end for the target and none configured
    UnsupportedPlatform(Platform),
    /// An option value has the wrong shape
    InvalidOptionType {
        field: String,
        expected: &'static str,
    },
    /// A required option is absent
    MissingOption(&'static str),
    /// An option name the synthesizer does not know
    UnknownOption(String),
}

impl std::fmt::Display for SynthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthError::UnsupportedPlatform(p) => write!(
                f,
                "Unsupported compilation platform '{}': set [toolchain] cc in ph.toml",
                p
            ),
            SynthError::InvalidOptionType { field, expected } => {
                write!(f, "Option '{}' must be {}", field, expected)
            }
            SynthError::MissingOption(field) => write!(f, "Missing required option '{}'", field),
            SynthError::UnknownOption(field) => write!(f, "Unknown option '{}'", field),
        }
    }
}

impl std::error::Error for SynthError {}
