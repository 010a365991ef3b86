//! Platform capability records.
//!
//! Every supported operating system is one variant of [`Platform`]. The
//! variant carries the constants the command synthesizer needs (artifact
//! extensions, path conventions, the C front end and the default Python
//! locations). The running platform is probed once at start-up with
//! [`Platform::detect`] and treated as read-only afterwards.

/// Compiler front-end families, distinguished by their argument syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FrontEnd {
    /// GCC-compatible driver (`gcc`, `clang`): `-I`, `-l`, `-L`, `-o`
    GCC { cc: &'static str, cxx: &'static str },
    /// Microsoft Visual C++ (`cl.exe`): `/I`, `/Fe`, `/link /LIBPATH:`
    MSVC,
}

impl FrontEnd {
    pub fn uses_msvc_flags(&self) -> bool {
        matches!(self, FrontEnd::MSVC)
    }
}

/// Default Python locations used when linking Cython extension modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PythonPaths {
    pub include: Option<String>,
    pub lib: Option<String>,
    pub lib_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    Mac,
    /// Any OS without a capability record. Paths follow POSIX rules but no
    /// compiler front end is known.
    Other,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Mac];

    /// Probe the running OS.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name (as in `std::env::consts::OS`) to its record.
    pub fn from_os(os: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| os.starts_with(p.identifier()))
            .unwrap_or(Platform::Other)
    }

    /// Look a platform up by its user-facing name (`windows`, `linux`, `mac`).
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::Other => "other",
        }
    }

    /// Prefix matched against the OS name when probing.
    pub fn identifier(&self) -> &'static str {
        match self {
            Platform::Windows => "win",
            Platform::Linux => "linux",
            Platform::Mac => "macos",
            Platform::Other => "",
        }
    }

    pub fn shared_ext(&self) -> &'static str {
        match self {
            Platform::Windows => "dll",
            Platform::Linux | Platform::Other => "so",
            Platform::Mac => "dylib",
        }
    }

    pub fn binary_ext(&self) -> &'static str {
        match self {
            Platform::Windows => "exe",
            _ => "",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    pub fn separator(&self) -> char {
        if self.is_windows() { '\\' } else { '/' }
    }

    /// The C front end shipped with this platform, if one is known.
    pub fn front_end(&self) -> Option<FrontEnd> {
        match self {
            Platform::Linux => Some(FrontEnd::GCC {
                cc: "gcc",
                cxx: "g++",
            }),
            Platform::Mac => Some(FrontEnd::GCC {
                cc: "clang",
                cxx: "clang++",
            }),
            Platform::Windows => Some(FrontEnd::MSVC),
            Platform::Other => None,
        }
    }

    pub fn python(&self) -> PythonPaths {
        match self {
            Platform::Linux => PythonPaths {
                include: Some("/usr/include/python2.7/".to_string()),
                lib: Some("python2.7".to_string()),
                lib_dir: None,
            },
            _ => PythonPaths::default(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
