//! Chunk-name resolution for dynamic-import call sites.
//!
//! Priority order:
//! 1. An explicit `webpackChunkName: "<name>"` annotation in the leading
//!    comment wins verbatim - no further sanitization.
//! 2. Otherwise the name is the import target's path relative to the source
//!    root (or the current directory), with every non-word character
//!    replaced by `-`.
//!
//! All path math here is lexical. The transform runs over sources that may
//! not exist on the build machine's filesystem at this point, so nothing is
//! canonicalized.

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use super::ast::ImportCall;

/// Explicit chunk-name annotation, e.g. `/* webpackChunkName: "custom" */`.
static CHUNK_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"webpackChunkName:\s*"([^"]+)""#).unwrap());

/// Matches every character that is not `[A-Za-z0-9_]`.
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

// =============================================================================
// TransformOptions
// =============================================================================

/// Per-file context for the import transform.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Project source root computed names are relative to. Falls back to the
    /// process working directory when unset.
    pub source_root: Option<PathBuf>,
    /// The file whose call sites are being transformed. Relative specifiers
    /// resolve against its parent directory.
    pub current_file: PathBuf,
}

impl TransformOptions {
    pub fn new(current_file: impl Into<PathBuf>) -> Self {
        Self {
            source_root: None,
            current_file: current_file.into(),
        }
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve the chunk name for one dynamic-import call site.
pub fn resolve_chunk_name(import: &ImportCall, opts: &TransformOptions) -> String {
    // Explicit annotation always wins, verbatim.
    if let Some(comment) = &import.comment
        && let Some(caps) = CHUNK_NAME_RE.captures(comment)
    {
        return caps[1].to_string();
    }

    let root = opts
        .source_root
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let dir = opts.current_file.parent().unwrap_or_else(|| Path::new(""));
    let target = lexical_join(dir, Path::new(&import.specifier));

    sanitize(&relative_from(&target, &root).to_string_lossy())
}

/// Replace every non-word character with `-`.
fn sanitize(name: &str) -> String {
    NON_WORD_RE.replace_all(name, "-").into_owned()
}

/// Join and resolve `.`/`..` components lexically, without touching the
/// filesystem.
fn lexical_join(base: &Path, rel: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in base.components().chain(rel.components()) {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Lexical relative path of `path` as seen from `base`.
fn relative_from(path: &Path, base: &Path) -> PathBuf {
    let mut path_iter = path.components();
    let mut base_iter = base.components();
    let mut out = PathBuf::new();

    loop {
        match (path_iter.clone().next(), base_iter.clone().next()) {
            (Some(p), Some(b)) if p == b => {
                path_iter.next();
                base_iter.next();
            }
            (_, None) => {
                out.extend(path_iter);
                break;
            }
            (_, Some(_)) => {
                // Remaining base components become `..` hops.
                for _ in base_iter.by_ref() {
                    out.push("..");
                }
                out.extend(path_iter);
                break;
            }
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ast::ImportCall;

    fn opts() -> TransformOptions {
        TransformOptions::new("/project/pages/a/index.js").with_source_root("/project")
    }

    mod explicit_annotation {
        use super::*;

        #[test]
        fn annotation_wins_verbatim() {
            let import =
                ImportCall::new("../far/away.js").with_comment(r#" webpackChunkName: "custom" "#);
            assert_eq!(resolve_chunk_name(&import, &opts()), "custom");
        }

        #[test]
        fn annotation_is_not_sanitized() {
            let import =
                ImportCall::new("./b.js").with_comment(r#"webpackChunkName: "my/raw name""#);
            assert_eq!(resolve_chunk_name(&import, &opts()), "my/raw name");
        }

        #[test]
        fn unrelated_comment_is_ignored() {
            let import = ImportCall::new("./b.js").with_comment("preload hint");
            assert_eq!(resolve_chunk_name(&import, &opts()), "pages-a-b-js");
        }
    }

    mod computed_name {
        use super::*;

        #[test]
        fn relative_specifier_resolves_against_file_dir() {
            let import = ImportCall::new("./b.js");
            assert_eq!(resolve_chunk_name(&import, &opts()), "pages-a-b-js");
        }

        #[test]
        fn parent_hops_are_resolved_lexically() {
            let import = ImportCall::new("../../components/big.js");
            assert_eq!(resolve_chunk_name(&import, &opts()), "components-big-js");
        }

        #[test]
        fn target_outside_root_keeps_parent_hops() {
            let import = ImportCall::new("./b.js");
            let opts = TransformOptions::new("/project/pages/a/index.js")
                .with_source_root("/project/other");
            assert_eq!(resolve_chunk_name(&import, &opts), "---pages-a-b-js");
        }
    }

    #[test]
    fn sanitize_replaces_every_non_word_char() {
        assert_eq!(sanitize("pages/a/b.js"), "pages-a-b-js");
        assert_eq!(sanitize("with space+plus"), "with-space-plus");
        assert_eq!(sanitize("under_score"), "under_score");
    }

    #[test]
    fn lexical_join_handles_dots() {
        assert_eq!(
            lexical_join(Path::new("/p/pages/a"), Path::new(".././b.js")),
            PathBuf::from("/p/pages/b.js")
        );
    }

    #[test]
    fn relative_from_shared_prefix() {
        assert_eq!(
            relative_from(Path::new("/p/pages/a/b.js"), Path::new("/p")),
            PathBuf::from("pages/a/b.js")
        );
    }
}
