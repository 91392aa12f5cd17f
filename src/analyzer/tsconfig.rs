//! tsconfig.json discovery for alias auto-configuration.
//!
//! When the caller supplies no alias table, resolver settings come from the
//! nearest tsconfig.json at or above the analyzed root: `baseUrl` and
//! `paths`, tolerant of JSON5 syntax, with `extends` chains folded
//! base-first so settings closer to the project win.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The slice of a tsconfig the resolver cares about. Everything else in
/// the file is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    extends: Option<String>,
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    base_url: Option<String>,
    #[serde(default)]
    paths: HashMap<String, Vec<String>>,
}

/// Alias table and base directory recovered from a project's tsconfig.
#[derive(Debug, Clone)]
pub struct TsConfigAliases {
    /// Directory bare specifiers and alias targets are joined against,
    /// anchored at the config file that declared `baseUrl` (or the top
    /// config's directory when none does).
    pub base_dir: PathBuf,
    /// `paths`-style alias table, ready for the specifier resolver.
    pub paths: HashMap<String, Vec<String>>,
}

/// Read resolver settings for `root`, or `None` when no usable
/// tsconfig.json exists at or above it.
pub fn discover(root: &Path) -> Option<TsConfigAliases> {
    let top = nearest_config(root)?;
    let chain = extends_chain(&top);
    let top_dir = chain.first().map(|(dir, _)| dir.clone())?;

    // Fold base configs first so settings closer to the project win.
    let mut declared_base: Option<PathBuf> = None;
    let mut paths: HashMap<String, Vec<String>> = HashMap::new();
    for (dir, config) in chain.iter().rev() {
        if let Some(url) = &config.compiler_options.base_url {
            declared_base = Some(dir.join(url));
        }
        for (alias, targets) in &config.compiler_options.paths {
            let targets: Vec<String> = targets.iter().map(|t| t.replace('\\', "/")).collect();
            if !targets.is_empty() {
                paths.insert(alias.replace('\\', "/"), targets);
            }
        }
    }

    let base_dir = declared_base.unwrap_or(top_dir);
    Some(TsConfigAliases {
        base_dir: base_dir.canonicalize().unwrap_or(base_dir),
        paths,
    })
}

fn nearest_config(root: &Path) -> Option<PathBuf> {
    let start = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    start
        .ancestors()
        .map(|dir| dir.join("tsconfig.json"))
        .find(|candidate| candidate.is_file())
}

/// The `extends` chain starting at `top`, child first. A broken link ends
/// the chain; configs extending each other in a loop terminate through the
/// visited set.
fn extends_chain(top: &Path) -> Vec<(PathBuf, ConfigFile)> {
    let mut chain = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut pending = Some(top.to_path_buf());

    while let Some(config_path) = pending.take() {
        let identity = config_path
            .canonicalize()
            .unwrap_or_else(|_| config_path.clone());
        if !visited.insert(identity) {
            break;
        }
        let Some(config) = read_config(&config_path) else {
            break;
        };
        let dir = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        pending = config
            .extends
            .as_ref()
            .map(|target| locate_parent(&dir, target))
            .filter(|parent| parent.is_file());
        chain.push((dir, config));
    }

    chain
}

/// `extends` targets may be absolute or relative, and may omit the `.json`
/// suffix.
fn locate_parent(dir: &Path, target: &str) -> PathBuf {
    let direct = if Path::new(target).is_absolute() {
        PathBuf::from(target)
    } else {
        dir.join(target)
    };
    if direct.is_file() {
        return direct;
    }
    let mut with_suffix = direct.clone().into_os_string();
    with_suffix.push(".json");
    let with_suffix = PathBuf::from(with_suffix);
    if with_suffix.is_file() { with_suffix } else { direct }
}

fn read_config(path: &Path) -> Option<ConfigFile> {
    let text = fs::read_to_string(path).ok()?;
    if let Ok(config) = serde_json::from_str(&text) {
        return Some(config);
    }
    // tsconfig files are frequently JSON5 in the wild.
    let relaxed: serde_json::Value = json_five::from_str(&text).ok()?;
    serde_json::from_value(relaxed).ok()
}
