//! File discovery: recursive directory walk with ignore rules.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::analyzer::extractor::SourceDialect;

/// Compiled ignore patterns. `*` matches any run of characters (separators
/// included), `?` matches exactly one character. A pattern containing
/// neither is a substring-or-exact-basename match. A pattern matches when
/// it matches the full path or the basename.
pub struct IgnoreMatcher {
    patterns: Vec<IgnorePattern>,
}

enum IgnorePattern {
    Glob(Regex),
    Plain(String),
}

impl IgnoreMatcher {
    pub fn new(patterns: &[String]) -> Self {
        let mut compiled = Vec::new();
        for pat in patterns {
            let pat = pat.trim();
            if pat.is_empty() {
                continue;
            }
            if pat.contains('*') || pat.contains('?') {
                match Regex::new(&glob_to_regex(pat)) {
                    Ok(re) => compiled.push(IgnorePattern::Glob(re)),
                    Err(err) => {
                        eprintln!("[cyclops][warn] invalid ignore pattern '{}': {}", pat, err)
                    }
                }
            } else {
                compiled.push(IgnorePattern::Plain(pat.to_string()));
            }
        }
        Self { patterns: compiled }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_match(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let full = path.to_string_lossy();
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.patterns.iter().any(|p| match p {
            IgnorePattern::Glob(re) => re.is_match(&full) || re.is_match(&base),
            IgnorePattern::Plain(s) => full.contains(s.as_str()) || base == *s,
        })
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}

pub fn matches_extension(path: &Path, allowed: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.contains(&ext.to_lowercase()))
        .unwrap_or(false)
}

/// Recursively collect source files under `dir`. Unreadable directories are
/// skipped without error; entries are visited in name order so the result
/// is deterministic for a fixed tree.
pub fn gather_source_files(
    dir: &Path,
    allowed: &HashSet<String>,
    ignored_dirs: &HashSet<String>,
    matcher: &IgnoreMatcher,
    follow_symlinks: bool,
    files: &mut Vec<PathBuf>,
) {
    let Ok(read) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = read.filter_map(Result::ok).collect();
    entries.sort_by(|a, b| {
        a.file_name()
            .to_string_lossy()
            .to_lowercase()
            .cmp(&b.file_name().to_string_lossy().to_lowercase())
    });

    for entry in entries {
        let path = entry.path();
        let is_symlink = entry
            .file_type()
            .map(|t| t.is_symlink())
            .unwrap_or(false);
        if is_symlink && !follow_symlinks {
            continue;
        }

        if path.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if ignored_dirs.contains(&name) {
                continue;
            }
            if matcher.is_match(&path) {
                continue;
            }
            gather_source_files(&path, allowed, ignored_dirs, matcher, follow_symlinks, files);
            continue;
        }

        if path.is_file() {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            if !allowed.contains(&ext) || SourceDialect::from_extension(&ext).is_none() {
                continue;
            }
            if matcher.is_match(&path) {
                continue;
            }
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    fn allowed() -> HashSet<String> {
        crate::types::DEFAULT_EXTENSIONS
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    fn ignored() -> HashSet<String> {
        crate::types::DEFAULT_IGNORED_DIRS
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn gathers_source_files_and_skips_ignored_dirs() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("src/app.ts"), "export {}").unwrap();
        fs::write(root.join("src/readme.md"), "# no").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "module.exports = {}").unwrap();

        let mut files = Vec::new();
        let matcher = IgnoreMatcher::new(&[]);
        gather_source_files(root, &allowed(), &ignored(), &matcher, false, &mut files);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.ts"));
    }

    #[test]
    fn discovery_is_deterministic() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        for name in ["zeta.ts", "alpha.ts", "midway.ts"] {
            fs::write(root.join(name), "export {}").unwrap();
        }

        let matcher = IgnoreMatcher::new(&[]);
        let mut first = Vec::new();
        gather_source_files(root, &allowed(), &ignored(), &matcher, false, &mut first);
        let mut second = Vec::new();
        gather_source_files(root, &allowed(), &ignored(), &matcher, false, &mut second);

        assert_eq!(first, second);
        assert!(first[0].ends_with("alpha.ts"));
        assert!(first[2].ends_with("zeta.ts"));
    }

    #[test]
    fn glob_star_crosses_separators() {
        let matcher = IgnoreMatcher::new(&["*.test.ts".to_string()]);
        assert!(matcher.is_match(Path::new("/repo/src/deep/button.test.ts")));
        assert!(!matcher.is_match(Path::new("/repo/src/button.ts")));
    }

    #[test]
    fn glob_question_mark_matches_single_char() {
        let matcher = IgnoreMatcher::new(&["file?.ts".to_string()]);
        assert!(matcher.is_match(Path::new("file1.ts")));
        assert!(!matcher.is_match(Path::new("file12.ts")));
    }

    #[test]
    fn plain_pattern_is_substring_or_basename() {
        let matcher = IgnoreMatcher::new(&["generated".to_string()]);
        assert!(matcher.is_match(Path::new("/repo/src/generated/api.ts")));
        assert!(matcher.is_match(Path::new("/repo/generated")));
        assert!(!matcher.is_match(Path::new("/repo/src/api.ts")));
    }

    #[test]
    fn ignore_patterns_apply_to_files() {
        let tmp = tempfile::tempdir().expect("tmp dir");
        let root = tmp.path();
        fs::write(root.join("keep.ts"), "export {}").unwrap();
        fs::write(root.join("skip.spec.ts"), "export {}").unwrap();

        let matcher = IgnoreMatcher::new(&["*.spec.ts".to_string()]);
        let mut files = Vec::new();
        gather_source_files(root, &allowed(), &ignored(), &matcher, false, &mut files);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.ts"));
    }

    #[test]
    fn unreadable_root_yields_empty_list() {
        let matcher = IgnoreMatcher::new(&[]);
        let mut files = Vec::new();
        gather_source_files(
            Path::new("/definitely/not/a/real/dir"),
            &allowed(),
            &ignored(),
            &matcher,
            false,
            &mut files,
        );
        assert!(files.is_empty());
    }
}
