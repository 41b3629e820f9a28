//! Package naming: maps a file path to its canonical package identifier.
//!
//! A package identifier is `dir/stem`: `/`-separated, extension-free and
//! relative to the configured base directory. Import targets resolved by
//! [`crate::resolve`] have the same shape, so both can be fed to the
//! layer matcher as-is.

/// Lexically normalizes a path.
///
/// Backslashes become `/`, empty and `.` segments are dropped and `..`
/// pops the previous segment. A leading `..` is kept for relative paths
/// and dropped at the root of an absolute one. No filesystem access.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Strips `base_dir` and one following separator from a normalized directory.
///
/// Only whole segments are stripped: `/src` is removed from `/src/domain`
/// but not from `/srcfoo`. A directory equal to `base_dir` becomes empty.
#[must_use]
pub fn strip_base_dir<'a>(dir: &'a str, base_dir: &str) -> &'a str {
    if base_dir.is_empty() {
        return dir;
    }
    if dir == base_dir {
        return "";
    }
    let rest = match dir.strip_prefix(base_dir) {
        Some(rest) => rest,
        None => return dir,
    };
    if base_dir.ends_with('/') {
        rest
    } else {
        rest.strip_prefix('/').unwrap_or(dir)
    }
}

/// Removes the final extension of a file name (`order.service.ts` -> `order.service`).
#[must_use]
pub fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Converts a file path into its package identifier.
///
/// # Example
///
/// ```
/// use layer_lint_ts::package::to_package;
///
/// assert_eq!(to_package("/proj/src/domain/order.ts", "/proj/src"), "domain/order");
/// assert_eq!(to_package("/proj/src/index.ts", "/proj/src"), "index");
/// ```
#[must_use]
pub fn to_package(file_path: &str, base_dir: &str) -> String {
    let normalized = normalize_path(file_path);
    let base = normalize_path(base_dir);

    let (dir, name) = match normalized.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((dir, name)) => (dir, name),
        None => ("", normalized.as_str()),
    };

    join_package(strip_base_dir(dir, &base), file_stem(name))
}

pub(crate) fn join_package(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
