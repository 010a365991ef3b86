use std::collections::BTreeMap;

/// Project version as declared by `project_version(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    Text(String),
    Parts(Vec<i64>),
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::Text(s) => f.write_str(s),
            Version::Parts(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                f.write_str(&parts.join("."))
            }
        }
    }
}

/// Descriptive metadata set by the project script's top-level statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMeta {
    pub name: Option<String>,
    pub version: Option<Version>,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Declared command-line options: name -> description
    pub options: BTreeMap<String, String>,
}
