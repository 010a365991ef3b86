//! Glob-pattern deletion for project scripts (`delete("build/*.so")`).
//!
//! Supported wildcards: `*` (any run of characters inside one path
//! segment), `?` (one character) and `**` (any number of segments).

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// Translate a glob pattern into an anchored regex over `/`-separated paths.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    re.push_str("(?:.*/)?");
                } else {
                    re.push_str(".*");
                }
            }
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            _ => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).with_context(|| format!("Invalid glob pattern '{}'", pattern))
}

/// Expand `pattern` to the existing paths it matches.
pub fn glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.replace('\\', "/");

    if !has_wildcard(&pattern) {
        let path = PathBuf::from(&pattern);
        return Ok(if path.exists() { vec![path] } else { Vec::new() });
    }

    // Walk from the deepest directory without wildcards
    let segments: Vec<&str> = pattern.split('/').collect();
    let fixed = segments.iter().take_while(|s| !has_wildcard(s)).count();
    let base = segments[..fixed].join("/");
    let walk_root = match base.as_str() {
        "" if pattern.starts_with('/') => "/".to_string(),
        "" => ".".to_string(),
        _ => base.clone(),
    };

    let matcher = glob_to_regex(&pattern)?;
    let mut matches = Vec::new();
    for entry in WalkDir::new(&walk_root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let mut candidate = entry.path().to_string_lossy().replace('\\', "/");
        if base.is_empty() && !pattern.starts_with('/') {
            candidate = candidate.trim_start_matches("./").to_string();
        }
        if matcher.is_match(&candidate) {
            matches.push(entry.into_path());
        }
    }
    Ok(matches)
}

/// Delete every file or directory matching `pattern`. Returns how many
/// matched paths were removed.
pub fn delete(pattern: &str) -> Result<usize> {
    let mut removed = 0;
    for path in glob(pattern)? {
        // A parent matched earlier may already have taken this one with it
        if !path.exists() {
            continue;
        }
        remove(&path)?;
        removed += 1;
    }
    Ok(removed)
}

fn remove(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path).with_context(|| format!("Failed to remove {}", path.display()))
    } else {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))
    }
}
