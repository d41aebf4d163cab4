use anyhow::{Context, Result};
use draftxml_config::Config;
use draftxml_engine::{StandardCatalog, parse_draft_with, render_xml};
use std::{env, path::PathBuf, process};

const USAGE: &str = "Usage: draftxml <input.txt> [-o <output.xml>] [--config <path>] [-v]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut input = None;
    let mut parsed = Args::default();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let path = it.next().ok_or(format!("{arg} needs a path"))?;
                parsed.output = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = it.next().ok_or(format!("{arg} needs a path"))?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => parsed.verbose = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag}")),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }
    parsed.input = input.ok_or("no input file given")?;
    Ok(parsed)
}

fn main() -> Result<()> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = Config::load_or_default(args.config.as_deref())?;
    let name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let parsed = match parse_draft_with(&name, &text, &config.heuristics, &StandardCatalog) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}: {e}", args.input.display());
            process::exit(1);
        }
    };
    log::info!(
        "{}: {} warnings",
        args.input.display(),
        parsed.diagnostics.len()
    );

    let xml = render_xml(&parsed.document, &config.output);
    match &args.output {
        Some(path) => std::fs::write(path, xml)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{xml}"),
    }
    Ok(())
}
