//! CLI tool for checking PowerPoint decks against slide-design guidelines.

mod watch;

use anyhow::{bail, Context, Result};
use clap::Parser;
use deckcheck_core::{Config, FeedbackModel, HtmlReport, Lexicon, RuleEngine};
use deckcheck_pptx::PptxParser;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Check a presentation and write a feedback report.
#[derive(Parser, Debug)]
#[command(name = "deckcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Presentation to check (.pptx)
    presentation: PathBuf,

    /// Report file to write
    #[arg(short, long, default_value = "output.html")]
    output: PathBuf,

    /// Threshold configuration (YAML); defaults are used when it is missing
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Re-run the check whenever the presentation or configuration changes
    #[arg(short, long)]
    watch: bool,

    /// Write the feedback model as JSON instead of HTML
    #[arg(long)]
    json: bool,

    /// Extra lexicon entries for sentence detection (word<TAB>tags per line)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if !is_pptx(&args.presentation) {
        bail!(
            "Input file must be of '.pptx' type: {}",
            args.presentation.display()
        );
    }

    let lexicon = load_lexicon(args.lexicon.as_deref())?;

    if !args.watch {
        check(&args, &lexicon)?;
        return Ok(());
    }

    if let Err(e) = check(&args, &lexicon) {
        eprintln!("Error: {:#}", e);
    }
    let watched = [args.presentation.as_path(), args.config.as_path()];
    watch::watch(&watched, || {
        log::info!("Presentation or configuration changed, checking again");
        // A failed run leaves the previous report in place.
        if let Err(e) = check(&args, &lexicon) {
            eprintln!("Error: {:#}", e);
        }
    })
}

/// Parse, evaluate and write the report once.
fn check(args: &Args, lexicon: &Lexicon) -> Result<FeedbackModel> {
    let config = load_config(&args.config)?;

    let deck = PptxParser::new()
        .parse_file(&args.presentation)
        .with_context(|| format!("Failed to read {}", args.presentation.display()))?;
    log::debug!("Loaded {} slides", deck.slides.len());

    let model = RuleEngine::with_lexicon(config, lexicon).evaluate(&deck);

    let report = if args.json {
        serde_json::to_string_pretty(&model).context("Failed to serialize feedback")?
    } else {
        let title = args
            .presentation
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Presentation feedback");
        HtmlReport::new().with_title(title).render(&model)
    };
    write_output(&args.output, &report)?;

    match &model.total_time {
        Some(total) => println!("Estimated total time for presentation: {}", total),
        None => println!("Cannot estimate presentation time without any speaker notes provided!"),
    }
    for (number, findings) in model.slides_with_findings() {
        log::info!("Slide {}: {}", number, findings.replace('\n', "; "));
    }
    if args.verbose {
        eprintln!(
            "{} (report written to {})",
            if model.passed { "All checks passed" } else { "Some checks failed" },
            args.output.display()
        );
    }

    Ok(model)
}

fn is_pptx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pptx"))
}

/// Read the configuration, falling back to defaults when the file is absent.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::warn!(
            "Configuration {} not found, using default thresholds",
            path.display()
        );
        return Ok(Config::default());
    }
    Config::load(path).with_context(|| format!("Failed to load configuration {}", path.display()))
}

/// The built-in lexicon, extended with the entries of `path` if given.
fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    let mut lexicon = Lexicon::builtin().clone();
    if let Some(path) = path {
        let extra = Lexicon::load(path)
            .with_context(|| format!("Failed to load lexicon {}", path.display()))?;
        lexicon.extend(&extra);
    }
    Ok(lexicon)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
