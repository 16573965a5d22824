//! Path resolution
//!
//! Maps a command argument plus the session working directory to an
//! absolute, normalized path string. `..` segments are NOT resolved and
//! nothing confines the result to a served root; see the crate-level
//! security caveat.

/// Resolve a path argument against the session working directory.
///
/// An argument starting with `/` is taken as absolute, anything else is
/// joined to `cwd`. Duplicate separators are collapsed and a trailing
/// separator is stripped; the root stays `/`.
pub fn resolve(cwd: &str, argument: &str) -> String {
    let joined = if argument.starts_with('/') {
        argument.to_string()
    } else if cwd == "/" {
        format!("/{argument}")
    } else {
        format!("{cwd}/{argument}")
    };

    normalize(joined)
}

fn normalize(mut path: String) -> String {
    while path.contains("//") {
        path = path.replace("//", "/");
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_argument_ignores_cwd() {
        assert_eq!(resolve("/data", "/logs/boot.txt"), "/logs/boot.txt");
    }

    #[test]
    fn relative_argument_joins_cwd() {
        assert_eq!(resolve("/data", "boot.txt"), "/data/boot.txt");
        assert_eq!(resolve("/", "boot.txt"), "/boot.txt");
    }

    #[test]
    fn duplicate_separators_collapse() {
        assert_eq!(resolve("/data/", "sub//file"), "/data/sub/file");
        assert_eq!(resolve("/", "//a///b"), "/a/b");
    }

    #[test]
    fn trailing_separator_is_stripped() {
        assert_eq!(resolve("/", "data/"), "/data");
        assert_eq!(resolve("/data", "sub/"), "/data/sub");
    }

    #[test]
    fn root_does_not_collapse_to_empty() {
        assert_eq!(resolve("/", "/"), "/");
        assert_eq!(resolve("/", "///"), "/");
    }

    #[test]
    fn resolve_is_idempotent_on_absolute_paths() {
        for (cwd, arg) in [
            ("/data", "file.txt"),
            ("/", "a//b/"),
            ("/x/y", "/z"),
            ("/", "/"),
        ] {
            let once = resolve(cwd, arg);
            assert_eq!(resolve(cwd, &once), once);
        }
    }

    #[test]
    fn dot_dot_passes_through_unresolved() {
        assert_eq!(resolve("/data", "../etc/passwd"), "/data/../etc/passwd");
    }
}
