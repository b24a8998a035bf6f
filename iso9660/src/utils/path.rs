//! Lexical path handling
//!
//! Image paths always use `/`, are resolved against a working directory and
//! are folded to uppercase before lookup. No path ever touches the host
//! filesystem, so everything here is purely lexical.

/// Lexically clean a `/` separated path
///
/// Repeated separators and `.` components are dropped, `..` removes the
/// previous component and never climbs above the root of an absolute path.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return String::from(".");
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => String::from("."),
        (false, false) => joined,
    }
}

/// Join `name` onto `base` and clean the result
///
/// An absolute `name` replaces `base` entirely.
pub fn join(base: &str, name: &str) -> String {
    if name.starts_with('/') || base.is_empty() {
        clean(name)
    } else {
        clean(&format!("{}/{}", base, name))
    }
}

/// Resolve `name` against the working directory `cwd` into the absolute,
/// uppercase, cleaned key used by the lookup caches
pub fn resolve(cwd: &str, name: &str) -> String {
    let joined = join(cwd, name);
    let absolute = if joined.starts_with('/') {
        joined
    } else {
        clean(&format!("/{}", joined))
    };
    absolute.to_ascii_uppercase()
}

/// Components of an absolute cleaned path, root first
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty() && *c != ".")
}
