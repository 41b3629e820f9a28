//! Import resolution: maps an import specifier to a package identifier.

use crate::package::{file_stem, join_package, normalize_path, strip_base_dir};

/// Source-file extensions dropped from resolved relative specifiers.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Removes one pair of matching enclosing quotes, if present.
#[must_use]
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'"' | b'\'' | b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Returns true if any `/`-separated segment is `.` or `..`.
#[must_use]
pub fn is_relative(specifier: &str) -> bool {
    specifier
        .split(['/', '\\'])
        .any(|segment| segment == "." || segment == "..")
}

/// Resolves an import specifier found in `importing_file`.
///
/// Specifiers without relative segments (`react`, `@scope/pkg`) are
/// returned unchanged. Relative ones are joined against the importing
/// file's directory, normalized, and stripped of `base_dir`.
///
/// # Example
///
/// ```
/// use layer_lint_ts::resolve::resolve_import;
///
/// let base = "/proj/src";
/// let file = "/proj/src/domain/order.ts";
/// assert_eq!(resolve_import("'../infra/db'", file, base), "infra/db");
/// assert_eq!(resolve_import("\"some-lib\"", file, base), "some-lib");
/// ```
#[must_use]
pub fn resolve_import(specifier: &str, importing_file: &str, base_dir: &str) -> String {
    let specifier = unquote(specifier);
    if !is_relative(specifier) {
        return specifier.to_owned();
    }

    let importing = normalize_path(importing_file);
    let dir = importing.rsplit_once('/').map_or("", |(dir, _)| dir);
    let joined = if dir.is_empty() && !importing.starts_with('/') {
        normalize_path(specifier)
    } else {
        normalize_path(&format!("{dir}/{specifier}"))
    };

    let base = normalize_path(base_dir);
    let (dir, name) = match joined.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((dir, name)) => (dir, name),
        None => ("", joined.as_str()),
    };

    join_package(strip_base_dir(dir, &base), strip_source_extension(name))
}

fn strip_source_extension(name: &str) -> &str {
    let stem = file_stem(name);
    let ext = name.get(stem.len() + 1..).unwrap_or("");
    if stem.len() < name.len() && SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        stem
    } else {
        name
    }
}
