//! Utilities for paths as printed by the Go runtime.
//!
//! Tracebacks always print source locations with `/` as the directory
//! separator, even when the binary was built on Windows. The helpers in this
//! module therefore treat `/` as the canonical separator and only recognize
//! `\` when normalizing host-provided values (environment variables).

/// Returns `true` if the given character is any valid directory separator.
#[inline]
fn is_path_separator(c: char) -> bool {
    matches!(c, '\\' | '/')
}

/// Normalizes a host-provided path to the canonical `/`-separated form.
///
/// Backslashes are replaced with forward slashes and trailing separators are
/// stripped.
///
/// # Examples
///
/// ```
/// assert_eq!(gostack_common::normalize_path("C:\\go\\"), "C:/go");
/// assert_eq!(gostack_common::normalize_path("/usr/lib/go/"), "/usr/lib/go");
/// ```
pub fn normalize_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    normalized.trim_end_matches('/').to_string()
}

/// Splits a `/`-separated path into its components.
///
/// A leading run of separators is kept glued to the first component, so that
/// joining the components back with `/` reproduces an absolute path. Empty
/// components from doubled separators are dropped.
///
/// # Examples
///
/// ```
/// assert_eq!(gostack_common::split_path("/app/main.go"), vec!["/app", "main.go"]);
/// assert_eq!(gostack_common::split_path("a//b"), vec!["a", "b"]);
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'/' {
            continue;
        }
        // A leading run of separators belongs to the first component.
        if out.is_empty() && bytes[start..i].iter().all(|&b| b == b'/') {
            continue;
        }
        if i > start {
            out.push(&path[start..i]);
        }
        start = i + 1;
    }

    if start < bytes.len() {
        out.push(&path[start..]);
    }
    out
}

/// Joins two `/`-separated paths.
///
/// If the right-hand side is absolute, it replaces the left-hand side.
///
/// # Examples
///
/// ```
/// assert_eq!(gostack_common::join_path("/a/b", "c/d"), "/a/b/c/d");
/// assert_eq!(gostack_common::join_path("/a/b", "/c/d"), "/c/d");
/// ```
pub fn join_path(base: &str, other: &str) -> String {
    if base.is_empty() || other.starts_with('/') {
        return other.into();
    }
    if other.is_empty() {
        return base.into();
    }
    format!(
        "{}/{}",
        base.trim_end_matches(is_path_separator),
        other.trim_start_matches(is_path_separator)
    )
}

/// Returns the file name (the last path component) of a `/`-separated path.
///
/// # Examples
///
/// ```
/// assert_eq!(gostack_common::file_name("/app/main.go"), "main.go");
/// assert_eq!(gostack_common::file_name("<autogenerated>"), "<autogenerated>");
/// ```
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}
