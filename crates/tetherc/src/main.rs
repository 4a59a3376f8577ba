//! The Tether command line driver.
//!
//! - `tetherc translate <unit.json>` - Run naming and binding over a compilation unit
//! - `tetherc parse <snippet>` - Parse one snippet and print it back normalised
//!
//! Options:
//! - `--config` - Path to a tether.toml
//! - `--json` - Output diagnostics as JSON (one object per line)
//! - `--no-color` - Disable colorized output
//!
//! Set `TETHER_LOG` (e.g. `TETHER_LOG=debug`) to trace the passes on stderr.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tether_common::decl::{BindingMode, CompilationUnit, SourceLocation};
use tether_common::span::LineIndex;
use tether_snippet::{parse_snippet, print_fragment};
use tracing_subscriber::EnvFilter;

use tetherc::{render_diagnostic, translate, Diagnostic, DiagnosticOptions, TetherConfig};

#[derive(Parser)]
#[command(name = "tetherc", version, about = "Snippet binding and member naming for translated code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a compilation unit read from JSON
    Translate {
        /// Path to the compilation unit (JSON)
        unit: PathBuf,

        /// Path to a tether.toml configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output diagnostics as JSON (one object per line) instead of human-readable format
        #[arg(long)]
        json: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,
    },
    /// Parse a single snippet and print it normalised
    Parse {
        /// Snippet text
        snippet: String,

        /// Check the snippet as an inline expansion instead of a body
        #[arg(long)]
        inline: bool,

        /// Disable colorized output
        #[arg(long = "no-color")]
        no_color: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Translate {
            unit,
            config,
            json,
            no_color,
        } => {
            let opts = DiagnosticOptions {
                color: !no_color && !json,
                json,
            };
            run_translate(&unit, config.as_deref(), &opts).map_err(|e| (e, json))
        }
        Commands::Parse {
            snippet,
            inline,
            no_color,
        } => {
            let opts = DiagnosticOptions {
                color: !no_color,
                json: false,
            };
            run_parse(&snippet, inline, &opts).map_err(|e| (e, false))
        }
    };

    if let Err((e, json)) = result {
        if json {
            let msg = serde_json::json!({
                "code": "C0001",
                "severity": "error",
                "message": e,
                "file": "",
                "spans": [],
            });
            eprintln!("{}", msg);
        } else {
            eprintln!("error: {}", e);
        }
        process::exit(1);
    }
}

/// Install a stderr subscriber when `TETHER_LOG` is set.
fn init_tracing() {
    if let Ok(filter) = EnvFilter::try_from_env("TETHER_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

fn run_translate(
    path: &Path,
    config: Option<&Path>,
    opts: &DiagnosticOptions,
) -> Result<(), String> {
    let config = match config {
        Some(p) => TetherConfig::from_file(p)?,
        None => TetherConfig::default(),
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let unit: CompilationUnit = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;
    validate(&unit)?;

    let translation = translate(&unit, &config);
    for diag in &translation.diagnostics {
        eprint!("{}", render_diagnostic(diag, opts));
    }

    let output = serde_json::to_string_pretty(&translation)
        .map_err(|e| format!("Failed to write translation: {}", e))?;
    println!("{}", output);

    if translation.has_errors() {
        return Err("Translation failed due to errors above.".to_string());
    }
    Ok(())
}

/// Reject dangling ids before any pass indexes with them.
fn validate(unit: &CompilationUnit) -> Result<(), String> {
    let types = unit.types.len();
    let members = unit.members.len();
    let bad_type = unit
        .types
        .iter()
        .flat_map(|t| t.bases.iter())
        .chain(unit.members.iter().map(|m| &m.declaring_type))
        .find(|id| id.0 as usize >= types);
    if let Some(id) = bad_type {
        return Err(format!("Unknown type id {} in compilation unit", id.0));
    }
    let bad_member = unit
        .members
        .iter()
        .flat_map(|m| m.ancestors())
        .chain(unit.call_sites.iter().map(|c| c.callee))
        .find(|id| id.0 as usize >= members);
    if let Some(id) = bad_member {
        return Err(format!("Unknown member id {} in compilation unit", id.0));
    }
    Ok(())
}

fn run_parse(snippet: &str, inline: bool, opts: &DiagnosticOptions) -> Result<(), String> {
    let mode = if inline {
        BindingMode::InlineExpansion
    } else {
        BindingMode::BodyReplacement
    };
    match parse_snippet(snippet, mode) {
        Ok(fragment) => {
            println!("{}", print_fragment(&fragment));
            Ok(())
        }
        Err(err) => {
            let (line, column) = LineIndex::new(snippet).line_col(err.span.start);
            let location = SourceLocation::new("<command line>", line, column);
            let diag = Diagnostic::from_snippet_error(&err, snippet, location);
            eprint!("{}", render_diagnostic(&diag, opts));
            Err(format!("{} snippet did not parse", mode))
        }
    }
}
