use std::io::Read;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use compose_language_server::check::{exit_code, render, FileReport, EXIT_FAILURE};
use compose_language_server::config::{init_logging, CheckArgs, Config};
use compose_language_server::core::{ComposeDocument, DiagnosticProvider};
use compose_language_server::watch::FileWatcher;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let args = CheckArgs::parse();
    init_logging(&args.log_level);

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let config = Config::from_check_args(args, &cwd)?;
    let provider = DiagnosticProvider::with_hide_warnings(config.hide_warnings);

    let reading_stdin = config.files.is_empty() || config.files.iter().any(|f| f == Path::new("-"));
    if config.watch && reading_stdin {
        anyhow::bail!("--watch needs file arguments, not standard input");
    }

    let reports: Vec<FileReport> = if config.files.is_empty() {
        vec![check_stdin(&config, &provider)]
    } else {
        config
            .files
            .iter()
            .map(|file| check_input(file, &config, &provider))
            .collect()
    };
    print!("{}", render(&reports, &config)?);

    if !config.watch {
        return Ok(exit_code(&reports, config.fail_on_warnings));
    }

    let watcher = FileWatcher::new(&config.files)?;
    log::info!("Watching {} file(s) for changes", config.files.len());
    while let Some(changed) = watcher.next_change() {
        log::info!("{} changed, re-validating", changed.display());
        let report = check_file(&changed, &config, &provider);
        print!("{}", render(std::slice::from_ref(&report), &config)?);
    }

    Ok(exit_code(&reports, config.fail_on_warnings))
}

fn check_input(file: &Path, config: &Config, provider: &DiagnosticProvider) -> FileReport {
    if file == Path::new("-") {
        check_stdin(config, provider)
    } else {
        check_file(file, config, provider)
    }
}

fn check_file(path: &Path, config: &Config, provider: &DiagnosticProvider) -> FileReport {
    let name = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let document = ComposeDocument::new(text, config.input_format_for(Some(path)));
            FileReport::check(name, &document, provider)
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", name, e);
            FileReport::unreadable(name, format!("Failed to read file: {}", e))
        }
    }
}

fn check_stdin(config: &Config, provider: &DiagnosticProvider) -> FileReport {
    let mut text = String::new();
    match std::io::stdin().read_to_string(&mut text) {
        Ok(_) => {
            let document = ComposeDocument::new(text, config.input_format_for(None));
            FileReport::check("<stdin>", &document, provider)
        }
        Err(e) => FileReport::unreadable("<stdin>", format!("Failed to read standard input: {}", e)),
    }
}
