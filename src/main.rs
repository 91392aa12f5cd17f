use std::fs;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use anyhow::Context;

use cyclops::analyzer::output;
use cyclops::args::{self, ParsedArgs};
use cyclops::progress::{StatusLine, human_duration};
use cyclops::types::{AnalyzeOptions, OutputMode};

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match args::parse_args(&argv) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("[cyclops][error] {}", message);
            eprintln!("Run 'cyclops --help' for usage.");
            exit(2);
        }
    };

    if parsed.show_help {
        args::print_help();
        return;
    }
    if parsed.show_version {
        println!("cyclops {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    match run(parsed) {
        Ok(code) => exit(code),
        Err(err) => {
            eprintln!("[cyclops][error] {:#}", err);
            exit(1);
        }
    }
}

fn run(parsed: ParsedArgs) -> anyhow::Result<i32> {
    let root = parsed.root.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut options = AnalyzeOptions {
        enable_cache: !parsed.no_cache,
        follow_symlinks: parsed.follow_symlinks,
        ignore_patterns: parsed.ignore_patterns.clone(),
        max_cycles: parsed.max_cycles,
        ..AnalyzeOptions::default()
    };
    if let Some(extensions) = &parsed.extensions {
        options.extensions = extensions.clone();
    }
    if let Some(concurrency) = parsed.concurrency {
        options.concurrency = concurrency;
    }

    // The status line draws on stderr, so it is safe alongside JSON on
    // stdout.
    let status = Arc::new(StatusLine::start());
    let callback_status = status.clone();
    options.progress = Some(Box::new(move |event| callback_status.update(event)));

    let result = match cyclops::analyze_directory(&root, &options) {
        Ok(result) => {
            status.finish(&format!(
                "analyzed {} files in {}",
                result.stats.total_files,
                human_duration(result.stats.duration)
            ));
            result
        }
        Err(err) => {
            status.clear();
            return Err(err).with_context(|| format!("analyzing {}", root.display()));
        }
    };

    match parsed.output {
        OutputMode::Json => {
            let json = output::to_json(&result);
            if let Some(path) = &parsed.json_out {
                fs::write(path, &json)
                    .with_context(|| format!("writing report to {}", path.display()))?;
                eprintln!("[cyclops] report written to {}", path.display());
            } else {
                println!("{}", json);
            }
        }
        OutputMode::Text => {
            print!("{}", output::render_text(&result));
            if let Some(path) = &parsed.json_out {
                fs::write(path, output::to_json(&result))
                    .with_context(|| format!("writing report to {}", path.display()))?;
                eprintln!("[cyclops] report written to {}", path.display());
            }
        }
    }

    Ok(if result.cycles.is_empty() { 0 } else { 1 })
}
