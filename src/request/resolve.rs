//! URL path to storage key.

/// A request path split into the document key components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedPath {
    /// Lower-cased leaf segment, kept verbatim otherwise (size directive and
    /// extension included)
    pub name: String,

    /// Lower-cased folder segments joined by commas
    pub path: String,
}

/// Split a decoded URL path into `(name, path)`.
///
/// The last `/`-separated segment is always the name, even when empty, so
/// `/` and `/a/` resolve to an empty name. Every other segment is trimmed,
/// dropped when empty and lower-cased to form the folder path.
///
/// Trimming strips all Unicode whitespace, from the leaf as well as the
/// folders, so ` a.png` and `a.png` name the same document.
pub fn resolve(url_path: &str) -> ResolvedPath {
    let (folders, leaf) = match url_path.rsplit_once('/') {
        Some((folders, leaf)) => (folders, leaf),
        None => ("", url_path),
    };

    let path = folders
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(",");

    ResolvedPath {
        name: leaf.trim().to_lowercase(),
        path,
    }
}
