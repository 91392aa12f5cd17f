//! Command-line argument parsing. Hand-rolled: the surface is one command
//! with a handful of flags.

use std::path::PathBuf;

use crate::types::OutputMode;

pub struct ParsedArgs {
    pub root: Option<PathBuf>,
    pub output: OutputMode,
    pub ignore_patterns: Vec<String>,
    /// Overrides the default extension set, in declared order.
    pub extensions: Option<Vec<String>>,
    pub no_cache: bool,
    pub concurrency: Option<usize>,
    pub max_cycles: Option<usize>,
    pub json_out: Option<PathBuf>,
    pub follow_symlinks: bool,
    pub show_help: bool,
    pub show_version: bool,
}

impl Default for ParsedArgs {
    fn default() -> Self {
        Self {
            root: None,
            output: OutputMode::Text,
            ignore_patterns: Vec::new(),
            extensions: None,
            no_cache: false,
            concurrency: None,
            max_cycles: None,
            json_out: None,
            follow_symlinks: false,
            show_help: false,
            show_version: false,
        }
    }
}

pub fn parse_args(args: &[String]) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut saw_command = false;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "analyze" if !saw_command && parsed.root.is_none() => {
                saw_command = true;
            }
            "--output" => {
                parsed.output = match next_value(&mut iter, "--output")?.as_str() {
                    "text" => OutputMode::Text,
                    "json" => OutputMode::Json,
                    other => return Err(format!("--output expects text|json, got '{}'", other)),
                };
            }
            "--ignore" => {
                let pattern = next_value(&mut iter, "--ignore")?;
                if !pattern.trim().is_empty() {
                    parsed.ignore_patterns.push(pattern);
                }
            }
            "--ext" => {
                let list = parse_extensions(&next_value(&mut iter, "--ext")?);
                if list.is_empty() {
                    return Err("--ext expects a comma-separated extension list".to_string());
                }
                parsed.extensions = Some(list);
            }
            "--no-cache" => parsed.no_cache = true,
            "--follow-symlinks" => parsed.follow_symlinks = true,
            "--concurrency" => {
                parsed.concurrency =
                    Some(parse_positive_usize(&next_value(&mut iter, "--concurrency")?, "--concurrency")?);
            }
            "--max-cycles" => {
                parsed.max_cycles =
                    Some(parse_positive_usize(&next_value(&mut iter, "--max-cycles")?, "--max-cycles")?);
            }
            "--json-out" => {
                parsed.json_out = Some(PathBuf::from(next_value(&mut iter, "--json-out")?));
            }
            "-h" | "--help" => parsed.show_help = true,
            "-V" | "--version" => parsed.show_version = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown flag '{}'", flag));
            }
            path => {
                if parsed.root.is_some() {
                    return Err(format!("unexpected argument '{}'", path));
                }
                parsed.root = Some(PathBuf::from(path));
            }
        }
    }

    Ok(parsed)
}

fn next_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, String> {
    iter.next()
        .map(|v| v.to_string())
        .ok_or_else(|| format!("{} expects a value", flag))
}

fn parse_positive_usize(raw: &str, flag: &str) -> Result<usize, String> {
    let value = raw
        .parse::<usize>()
        .map_err(|_| format!("{} expects a positive integer", flag))?;
    if value == 0 {
        Err(format!("{} expects a positive integer", flag))
    } else {
        Ok(value)
    }
}

/// Split a comma-separated extension list, dropping dots and empties while
/// keeping declaration order.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for segment in raw.split(',') {
        let trimmed = segment.trim().trim_start_matches('.').to_lowercase();
        if !trimmed.is_empty() && !out.contains(&trimmed) {
            out.push(trimmed);
        }
    }
    out
}

pub fn print_help() {
    println!(
        r#"cyclops {} - circular dependency analyzer for JS/TS source trees

USAGE:
    cyclops [analyze] <path> [OPTIONS]

OPTIONS:
    --output <text|json>    Report format (default: text)
    --ignore <glob>         Skip matching paths; repeatable
    --ext <list>            Comma-separated extensions to analyze
    --no-cache              Disable the extraction cache
    --concurrency <n>       Files processed in parallel per batch (default: 50)
    --max-cycles <n>        Enumerate up to n elementary cycles instead of
                            one representative per component
    --json-out <path>       Write the JSON report to a file
    --follow-symlinks       Descend into symbolic links
    -h, --help              Show this help
    -V, --version           Show version

Exit code 0 when no cycles are found, 1 otherwise.
Set CYCLOPS_VERBOSE=1 for per-file diagnostics on stderr."#,
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ParsedArgs, String> {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        parse_args(&owned)
    }

    #[test]
    fn parses_analyze_command_with_path() {
        let parsed = parse(&["analyze", "./src"]).unwrap();
        assert_eq!(parsed.root, Some(PathBuf::from("./src")));
        assert_eq!(parsed.output, OutputMode::Text);
    }

    #[test]
    fn path_without_command_word_works() {
        let parsed = parse(&["./src"]).unwrap();
        assert_eq!(parsed.root, Some(PathBuf::from("./src")));
    }

    #[test]
    fn repeated_ignore_flags_accumulate() {
        let parsed = parse(&["a", "--ignore", "*.spec.ts", "--ignore", "fixtures"]).unwrap();
        assert_eq!(parsed.ignore_patterns, vec!["*.spec.ts", "fixtures"]);
    }

    #[test]
    fn output_json_and_misc_flags() {
        let parsed = parse(&[
            "analyze",
            ".",
            "--output",
            "json",
            "--no-cache",
            "--concurrency",
            "8",
            "--max-cycles",
            "20",
        ])
        .unwrap();
        assert_eq!(parsed.output, OutputMode::Json);
        assert!(parsed.no_cache);
        assert_eq!(parsed.concurrency, Some(8));
        assert_eq!(parsed.max_cycles, Some(20));
    }

    #[test]
    fn rejects_unknown_flag_and_bad_values() {
        assert!(parse(&["--wat"]).is_err());
        assert!(parse(&[".", "--output", "xml"]).is_err());
        assert!(parse(&[".", "--concurrency", "0"]).is_err());
        assert!(parse(&[".", "--ignore"]).is_err());
    }

    #[test]
    fn second_positional_is_rejected() {
        assert!(parse(&["a", "b"]).is_err());
    }

    #[test]
    fn extension_list_keeps_order_and_drops_dots() {
        assert_eq!(parse_extensions(".ts, tsx,, .TS"), vec!["ts", "tsx"]);
    }
}
