//! Module specifier resolution.
//!
//! Maps a specifier string plus its importing file onto a concrete file in
//! the analyzed tree, or nothing for external / unresolvable / out-of-tree
//! references. Aliases are consulted before the bare-external check so a
//! mapped `@/` prefix is not mistaken for a scoped package.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One alias table entry: a pattern (possibly `prefix/*`) and its
/// replacement templates in declaration order.
#[derive(Debug, Clone)]
struct AliasMapping {
    pattern: String,
    targets: Vec<String>,
    wildcard: bool,
}

/// Stateless resolver except for file-existence probes, which are cached.
#[derive(Debug)]
pub struct SpecifierResolver {
    root: PathBuf,
    base_dir: PathBuf,
    mappings: Vec<AliasMapping>,
    extensions: Vec<String>,
    cache: Mutex<HashMap<(PathBuf, String), Option<PathBuf>>>,
}

impl SpecifierResolver {
    /// `base_dir` defaults to `root` when no base URL is configured. Alias
    /// patterns are tried longest-first so `@core/*` wins over `@/*`.
    pub fn new(
        root: PathBuf,
        aliases: &HashMap<String, Vec<String>>,
        base_url: Option<&Path>,
        extensions: Vec<String>,
    ) -> Self {
        let base_dir = match base_url {
            Some(base) if base.is_absolute() => base.to_path_buf(),
            Some(base) => root.join(base),
            None => root.clone(),
        };

        let mut mappings: Vec<AliasMapping> = aliases
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(pattern, targets)| AliasMapping {
                wildcard: pattern.ends_with("/*"),
                pattern: pattern.clone(),
                targets: targets.clone(),
            })
            .collect();
        mappings.sort_by(|a, b| {
            b.pattern
                .len()
                .cmp(&a.pattern.len())
                .then(a.pattern.cmp(&b.pattern))
        });

        Self {
            root,
            base_dir,
            mappings,
            extensions,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `spec` as referenced from `from_file`. Returns the canonical
    /// absolute path of a file under the root, or `None`.
    pub fn resolve(&self, from_file: &Path, spec: &str) -> Option<PathBuf> {
        if spec.is_empty() {
            return None;
        }
        let from_dir = from_file.parent().unwrap_or(Path::new("")).to_path_buf();

        let key = (from_dir.clone(), spec.to_string());
        if let Ok(cache) = self.cache.lock()
            && let Some(cached) = cache.get(&key)
        {
            return cached.clone();
        }

        let result = self.resolve_uncached(&from_dir, spec);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, result.clone());
        }
        result
    }

    fn resolve_uncached(&self, from_dir: &Path, spec: &str) -> Option<PathBuf> {
        if spec.starts_with('.') {
            return self.probe(&from_dir.join(spec));
        }
        if Path::new(spec).is_absolute() {
            // Joining an absolute specifier replaces the base, so this
            // probes the literal path.
            return self.probe(&self.base_dir.join(spec));
        }
        if let Some(hit) = self.try_aliases(spec) {
            return Some(hit);
        }
        // Scoped packages are external unless an alias claimed them above.
        if spec.starts_with('@') && spec.contains('/') {
            return None;
        }
        self.probe(&self.base_dir.join(spec))
    }

    fn try_aliases(&self, spec: &str) -> Option<PathBuf> {
        for mapping in &self.mappings {
            if mapping.wildcard {
                let prefix = mapping.pattern.trim_end_matches("/*");
                let Some(tail) = spec
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('/'))
                else {
                    continue;
                };
                for target in &mapping.targets {
                    let replaced = if let Some(stem) = target.strip_suffix("/*") {
                        format!("{}/{}", stem, tail)
                    } else if target.contains('*') {
                        target.replacen('*', tail, 1)
                    } else {
                        format!("{}/{}", target.trim_end_matches('/'), tail)
                    };
                    if let Some(hit) = self.probe(&self.base_dir.join(replaced)) {
                        return Some(hit);
                    }
                }
            } else if spec == mapping.pattern {
                for target in &mapping.targets {
                    if let Some(hit) = self.probe(&self.base_dir.join(target)) {
                        return Some(hit);
                    }
                }
            } else if let Some(rest) = spec
                .strip_prefix(mapping.pattern.as_str())
                .and_then(|r| r.strip_prefix('/'))
            {
                for target in &mapping.targets {
                    let candidate = format!("{}/{}", target.trim_end_matches('/'), rest);
                    if let Some(hit) = self.probe(&self.base_dir.join(candidate)) {
                        return Some(hit);
                    }
                }
            }
        }
        None
    }

    /// File-existence probe, first hit wins: the candidate itself, the
    /// candidate with each allowed extension appended, an index file inside
    /// it, and finally the `.js -> .ts/.tsx` compiled-extension remap.
    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return self.admit(candidate);
        }

        for ext in &self.extensions {
            let mut with_ext = candidate.as_os_str().to_os_string();
            with_ext.push(".");
            with_ext.push(ext);
            let with_ext = PathBuf::from(with_ext);
            if with_ext.is_file() {
                return self.admit(&with_ext);
            }
        }

        for ext in &self.extensions {
            let index = candidate.join(format!("index.{}", ext));
            if index.is_file() {
                return self.admit(&index);
            }
        }

        if let Some(name) = candidate.to_str()
            && let Some(stem) = name.strip_suffix(".js")
        {
            for ext in ["ts", "tsx"] {
                let remapped = PathBuf::from(format!("{}.{}", stem, ext));
                if remapped.is_file() {
                    return self.admit(&remapped);
                }
            }
        }

        None
    }

    /// Canonicalize a hit and keep it only if it stays under the root.
    fn admit(&self, path: &Path) -> Option<PathBuf> {
        let canonical = path.canonicalize().ok()?;
        if canonical.starts_with(&self.root) {
            Some(canonical)
        } else {
            None
        }
    }
}
