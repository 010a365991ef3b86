//! Path rewriting for the target platform.
//!
//! Project scripts write paths POSIX-style, relative to the project file.
//! Before they reach a command line they are anchored at the project root
//! and converted to the target's conventions. `root` is expected to be
//! absolute (the project loader guarantees it); with an absolute root the
//! rewrite is idempotent.

use crate::platform::Platform;

pub fn normalize_path(path: &str, root: &str, platform: Platform) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut rel = path;
    while let Some(rest) = rel.strip_prefix("./").or_else(|| rel.strip_prefix(".\\")) {
        rel = rest;
    }

    let joined = if is_absolute(rel) || root.is_empty() {
        rel.to_string()
    } else {
        format!("{}/{}", root.trim_end_matches(['/', '\\']), rel)
    };

    if platform.is_windows() {
        drive_letter(&joined).replace('/', "\\")
    } else {
        joined.replace('\\', "/")
    }
}

/// Normalize a list, dropping empty entries and keeping order.
pub fn normalize_paths<S: AsRef<str>>(paths: &[S], root: &str, platform: Platform) -> Vec<String> {
    paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.is_empty())
        .map(|p| normalize_path(p, root, platform))
        .collect()
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || has_drive(path)
}

fn has_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

// /c/dir -> C:/dir
fn drive_letter(path: &str) -> String {
    let bytes = path.as_bytes();
    let single_letter = bytes.len() >= 2
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && (bytes.len() == 2 || bytes[2] == b'/');

    if single_letter {
        format!("{}:{}", (bytes[1] as char).to_ascii_uppercase(), &path[2..])
    } else {
        path.to_string()
    }
}

/// Split a normalized path into (directory with trailing separator, file name).
pub fn split_file_name(path: &str) -> (&str, &str) {
    match path.rfind(['/', '\\']) {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// File name without its last extension.
pub fn file_stem(path: &str) -> &str {
    let (_, name) = split_file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}
