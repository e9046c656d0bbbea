//! Path resolution and normalization utilities
//!
//! All paths handled by grove are plain strings with forward-slash separators,
//! independent of the host platform. Nothing in this module touches storage.

use unicode_normalization::UnicodeNormalization;

/// A path split into its components
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPath {
    /// `/`, a drive root such as `C:/`, or empty for relative paths
    pub root: String,
    /// Parent directory
    pub dir: String,
    /// Final segment including extension
    pub base: String,
    /// Extension including the leading dot, empty when there is none
    pub ext: String,
    /// Final segment without extension
    pub name: String,
}

/// Split a separator-normalized path into its root and the remainder.
fn split_root(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.len() == 2 {
            return (path, "");
        }
        if bytes[2] == b'/' {
            return (&path[..3], &path[3..]);
        }
    }
    if let Some(rest) = path.strip_prefix('/') {
        return ("/", rest);
    }
    ("", path)
}

/// Whether the path is absolute on any supported platform.
///
/// Both POSIX roots (`/a`) and drive roots (`C:/a`, `C:\a`) count.
pub fn is_absolute(path: &str) -> bool {
    let path = path.replace('\\', "/");
    !split_root(&path).0.is_empty()
}

/// Normalize a path without filesystem access
///
/// This function:
/// 1. Normalizes Unicode to NFC
/// 2. Converts `\` separators to `/`
/// 3. Collapses `.` and `..` segments and repeated separators
/// 4. Removes trailing slashes (except root)
///
/// An empty relative path normalizes to `.`.
pub fn normalize(path: &str) -> String {
    let normalized: String = path.nfc().collect();
    let normalized = normalized.replace('\\', "/");
    let (root, rest) = split_root(&normalized);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                // `..` above an absolute root stays at the root
                _ if !root.is_empty() => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (root.is_empty(), body.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => body,
        (false, _) => {
            // A bare drive (`C:`) gains its separator
            let root = if root.ends_with('/') {
                root.to_string()
            } else {
                format!("{}/", root)
            };
            format!("{}{}", root, body)
        }
    }
}

/// Join a segment onto a base path and normalize the result.
pub fn join(base: &str, segment: &str) -> String {
    if base.is_empty() {
        return normalize(segment);
    }
    if segment.is_empty() {
        return normalize(base);
    }
    normalize(&format!("{}/{}", base, segment))
}

/// Append a backend-reported relative path to `base` without rewriting it.
///
/// Unlike [`join`] no Unicode or separator normalization happens, so the
/// result names exactly the entry the backend reported.
pub fn append(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    if base.is_empty() || base == "." {
        return relative.to_string();
    }
    if base.ends_with('/') {
        format!("{}{}", base, relative)
    } else {
        format!("{}/{}", base, relative)
    }
}

/// Split a final segment into name and extension (with its dot).
pub fn split_extension(base: &str) -> (&str, &str) {
    match base.rfind('.') {
        // A leading dot marks a hidden file, not an extension
        Some(idx) if idx > 0 => (&base[..idx], &base[idx..]),
        _ => (base, ""),
    }
}

/// Resolve a possibly-relative path against `base`.
///
/// An absent input yields `base`; an absolute input is returned unchanged so
/// callers can opt out of the base entirely.
pub fn resolve(base: &str, maybe_relative: Option<&str>) -> String {
    match maybe_relative {
        None => normalize(base),
        Some(path) if is_absolute(path) => path.to_string(),
        Some(path) => join(base, path),
    }
}

/// Parent directory of a path (`.` for a bare relative name).
pub fn dirname(path: &str) -> String {
    let normalized = normalize(path);
    let (root, body) = split_root(&normalized);
    match body.rfind('/') {
        Some(idx) => format!("{}{}", root, &body[..idx]),
        None if root.is_empty() => ".".to_string(),
        None => root.to_string(),
    }
}

/// Final segment of a path (empty for a root).
pub fn basename(path: &str) -> String {
    let normalized = normalize(path);
    let (_, body) = split_root(&normalized);
    match body.rfind('/') {
        Some(idx) => body[idx + 1..].to_string(),
        None => body.to_string(),
    }
}

/// Parse a path into root, directory, base, extension, and name.
pub fn parse(path: &str) -> ParsedPath {
    let normalized = normalize(path);
    let (root, body) = split_root(&normalized);
    let root = root.to_string();

    if body.is_empty() {
        return ParsedPath {
            dir: root.clone(),
            root,
            ..Default::default()
        };
    }

    let base = basename(&normalized);
    let dir = dirname(&normalized);
    let (name, ext) = split_extension(&base);
    let (name, ext) = (name.to_string(), ext.to_string());

    ParsedPath {
        root,
        dir,
        base,
        ext,
        name,
    }
}

/// Express `path` relative to `root`, or `None` when it lies outside.
pub fn relative_to(root: &str, path: &str) -> Option<String> {
    let root = normalize(root);
    let path = normalize(path);
    if root == path {
        return Some(String::new());
    }
    let prefix = if root.ends_with('/') {
        root
    } else {
        format!("{}/", root)
    };
    path.strip_prefix(&prefix).map(str::to_string)
}
