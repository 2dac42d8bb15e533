//! Mock Rules TUI - terminal editor for HTTP mock rules
//!
//! # Usage
//!
//! ```bash
//! # Start from the built-in default rules
//! mock-rules-tui
//!
//! # Load default rules from a rule file
//! mock-rules-tui --rules ./team.htkrules
//!
//! # Write debug logs to a file
//! RUST_LOG=debug mock-rules-tui --log-file /tmp/mock-rules.log
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use mock_rules::ruleset::read_rules_file;
use mock_rules::{builtin_default_rules, lint_rules, MockRule, PageConfig, Severity};
use mock_rules_tui::{App, AppConfig};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mock-rules-tui")]
#[command(author, version, about = "Interactive editor for HTTP mock rules")]
struct Args {
    /// Rule file (.htkrules or .json) providing the default rules
    #[arg(long, env = "MOCK_RULES_FILE")]
    rules: Option<PathBuf>,

    /// MIME type of the rules file, for files without a .htkrules or .json
    /// extension (application/json or application/htkrules+json)
    #[arg(long, env = "MOCK_RULES_MIME", requires = "rules")]
    rules_mime: Option<String>,

    /// Folder offered for imports and exports
    #[arg(long, env = "MOCK_RULES_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(short, long, default_value = "250", value_parser = clap::value_parser!(u64).range(1..))]
    refresh_ms: u64,

    /// Delay before a newly added rule takes focus, in milliseconds
    #[arg(long, default_value = "100")]
    focus_delay_ms: u64,

    /// Append logs to this file; the terminal is owned by the UI
    #[arg(long, env = "MOCK_RULES_LOG")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Read the rules file used as the store's defaults, refusing files whose
/// rules would fail to lint
fn load_default_rules(path: &Path, mime: Option<&str>) -> anyhow::Result<Vec<MockRule>> {
    let rules = read_rules_file(path, mime)
        .with_context(|| format!("loading default rules from {}", path.display()))?;

    let report = lint_rules(&rules);
    for issue in report.issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!(code = issue.code, location = ?issue.location, "{}", issue.message);
    }
    if report.has_errors() {
        let first = report
            .issues
            .iter()
            .find(|i| i.severity == Severity::Error)
            .map(|i| format!("{} {}", i.code, i.message))
            .unwrap_or_default();
        bail!(
            "default rules in {} have {}: {}",
            path.display(),
            report.summary(),
            first
        );
    }
    info!(path = %path.display(), summary = %report.summary(), "loaded default rules");
    Ok(rules)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let defaults = match &args.rules {
        Some(path) => load_default_rules(path, args.rules_mime.as_deref())?,
        None => builtin_default_rules(),
    };

    let mut config = AppConfig {
        refresh_interval: Duration::from_millis(args.refresh_ms),
        page: PageConfig {
            focus_delay: Duration::from_millis(args.focus_delay_ms),
        },
        ..AppConfig::default()
    };
    if let Some(dir) = args.export_dir {
        config.export_dir = dir;
    }

    let app = App::new(config, defaults);
    mock_rules_tui::run(app).await
}
