//! Lexical path resolution for chunk paths.
//!
//! Nothing here touches the filesystem: symlinks and `..` segments are kept
//! exactly as written.

use imf_io::url_scheme;

/// Whether `path` is already absolute: a POSIX or UNC path, a Windows drive
/// path, or a URL with a scheme.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || is_drive_path(path) || url_scheme(path).is_some()
}

/// `C:\...` or `C:/...`
fn is_drive_path(path: &str) -> bool {
    let b = path.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && matches!(b[2], b'\\' | b'/')
}

/// `C:` on its own.
fn is_bare_drive(path: &str) -> bool {
    let b = path.as_bytes();
    b.len() == 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

/// Separator used when joining onto `base`.
///
/// URLs and POSIX paths use `/`; a Windows path written only with `\` keeps `\`.
fn separator_for(base: &str) -> char {
    if url_scheme(base).is_none() && base.contains('\\') && !base.contains('/') {
        '\\'
    } else {
        '/'
    }
}

/// Resolve `path` against the directory `base`.
///
/// Absolute paths and URLs are returned unchanged. Otherwise the two are
/// joined with one separator; an empty `base` means the current directory.
/// Redundant leading `./` segments of `path` are dropped, and its query
/// string or fragment is kept verbatim.
pub fn resolve_path(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let base = if base.is_empty() { "." } else { base };
    let sep = separator_for(base);

    let mut rel = path;
    while let Some(rest) = rel.strip_prefix("./").or_else(|| rel.strip_prefix(".\\")) {
        rel = rest;
    }

    let trimmed = base.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        // base was the filesystem root
        return format!("{sep}{rel}");
    }
    if let Some(scheme) = url_scheme(base) {
        // `file:///` and the like: the slashes are the empty authority and root
        if trimmed.len() == scheme.len() + 1 && base[trimmed.len()..].starts_with("//") {
            return format!("{base}{rel}");
        }
    }
    format!("{trimmed}{sep}{rel}")
}

/// Directory part of a locator.
///
/// Returns `"."` when the locator has no directory component and keeps the
/// root for root-level files. The query string and fragment of a URL are
/// dropped. A URL with no path is returned as is.
pub fn dirname(locator: &str) -> String {
    let scheme = url_scheme(locator);
    let path = match scheme {
        Some(_) => locator.split(['?', '#']).next().unwrap_or(locator),
        None => locator,
    };

    let authority_end = scheme
        .filter(|s| path[s.len() + 1..].starts_with("//"))
        .map(|s| s.len() + 3);

    match path.rfind(['/', '\\']) {
        None => ".".to_string(),
        Some(i) if authority_end.is_some_and(|end| i < end) => path.to_string(),
        // root-level file under an empty authority (`file:///x`) or none (`file:/x`)
        Some(i) if authority_end == Some(i) || scheme.is_some_and(|s| i == s.len() + 1) => {
            path[..=i].to_string()
        }
        Some(0) => path[..1].to_string(),
        Some(i) if is_bare_drive(&path[..i]) => path[..=i].to_string(),
        Some(i) => path[..i].to_string(),
    }
}
