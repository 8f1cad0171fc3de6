//! asterix: decode ASTERIX captures from the command line.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use log::info;

use asterix_core::config::{self, Config, OutputFormat};
use asterix_core::uap::SubFieldKind;
use asterix_core::{FieldKind, Uap};

mod input;
mod logger;
mod replay;

use replay::{decode_capture, Outcome, Summary};

#[derive(Parser)]
#[command(name = "asterix", version, about = "ASTERIX data block decoder")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ~/.asterix-decode/config.yaml)
    #[arg(long, env = "ASTERIX_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode captures and print every record
    Decode {
        /// File with one hex wrapper per line, or `-` for stdin
        file: PathBuf,

        /// Treat the input as one raw binary wrapper
        #[arg(short, long)]
        binary: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Step over failing data blocks instead of stopping
        #[arg(long)]
        skip_errors: bool,
    },

    /// Per-category block, record and byte counts
    Summary {
        /// File with one hex wrapper per line, or `-` for stdin
        file: PathBuf,

        /// Treat the input as one raw binary wrapper
        #[arg(short, long)]
        binary: bool,

        /// Step over failing data blocks instead of stopping
        #[arg(long)]
        skip_errors: bool,
    },

    /// List built-in profiles, or the items of one category
    Profiles {
        category: Option<u8>,

        /// Print the profile tables as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective config
    Config {
        /// Write the default config file
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let config_path = cli.config.unwrap_or_else(config::config_file);
    let config = config::load_config_from(&config_path);
    info!("config: {}", config_path.display());

    match cli.command {
        Commands::Decode {
            file,
            binary,
            json,
            skip_errors,
        } => {
            let format = if json {
                OutputFormat::Json
            } else {
                config.output.format
            };
            cmd_decode(&file, binary, format, skip_errors, &config)
        }
        Commands::Summary {
            file,
            binary,
            skip_errors,
        } => cmd_decode(&file, binary, OutputFormat::Summary, skip_errors, &config),
        Commands::Profiles { category, json } => cmd_profiles(category, json, &config),
        Commands::Config { init } => cmd_config(&config_path, init, &config),
    }
}

fn cmd_decode(
    file: &Path,
    binary: bool,
    format: OutputFormat,
    skip_errors: bool,
    config: &Config,
) {
    let captures = input::read_captures(file, binary).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", file.display());
        std::process::exit(1);
    });

    let profiles = config.profile_set();
    let skip_errors = skip_errors || config.decode.skip_errors;
    let mut summary = Summary::default();

    for capture in &captures {
        let outcome = decode_capture(&capture.data, &profiles, skip_errors);
        match format {
            OutputFormat::Text => print_text(&capture.label, &outcome),
            OutputFormat::Json => match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("{}: {e}", capture.label),
            },
            OutputFormat::Summary => {}
        }
        summary.add(&outcome);
    }

    if format == OutputFormat::Summary {
        print_summary(&summary);
    }
}

fn print_text(label: &str, outcome: &Outcome) {
    for line in text_lines(label, outcome) {
        println!("{line}");
    }
    println!();
}

/// Text rendering of one capture. Records are numbered from 1 within
/// each block.
fn text_lines(label: &str, outcome: &Outcome) -> Vec<String> {
    let mut out = vec![format!("# {label}")];
    for block in &outcome.wrapper.blocks {
        out.push(format!("Category: {}, Len: {}", block.category, block.len));
        for (n, lines) in block.to_display_strings().iter().enumerate() {
            out.push(format!("Record: {}", n + 1));
            out.extend(lines.iter().map(|line| format!("  {line}")));
        }
    }
    for issue in &outcome.issues {
        out.push(format!("Error at offset {}: {}", issue.offset, issue.error));
    }
    out
}

fn print_summary(summary: &Summary) {
    println!();
    println!(
        "Captures: {}, {} categories, {} errors",
        summary.captures,
        summary.per_category.len(),
        summary.issues
    );
    println!();

    if summary.per_category.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Blocks", "Records", "Bytes"]);
    for (category, stats) in &summary.per_category {
        table.add_row(vec![
            Cell::new(format!("{category:03}")),
            Cell::new(stats.blocks),
            Cell::new(stats.records),
            Cell::new(stats.bytes),
        ]);
    }
    println!("{table}");
}

fn cmd_profiles(category: Option<u8>, json: bool, config: &Config) {
    let profiles = config.profile_set();

    let selected: Vec<&Uap> = match category {
        Some(category) => match profiles.get(category) {
            Ok(uap) => vec![uap],
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => profiles.iter().collect(),
    };

    if json {
        match serde_json::to_string_pretty(&selected) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    match (category, selected.as_slice()) {
        (Some(_), [uap]) => print_profile_items(uap),
        _ => print_profile_list(&selected),
    }
}

fn print_profile_items(uap: &Uap) {
    println!();
    println!("{} (category {:03}, {} FRNs)", uap.name, uap.category, uap.len());
    println!();

    let mut table = Table::new();
    table.set_header(vec!["FRN", "Item", "Format"]);
    for field in &uap.fields {
        table.add_row(vec![
            Cell::new(field.frn),
            Cell::new(&field.tag),
            Cell::new(describe_kind(&field.kind)),
        ]);
    }
    println!("{table}");
}

fn print_profile_list(profiles: &[&Uap]) {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Profile", "FRNs"]);
    for uap in profiles {
        table.add_row(vec![
            Cell::new(format!("{:03}", uap.category)),
            Cell::new(&uap.name),
            Cell::new(uap.len()),
        ]);
    }
    println!("{table}");
}

/// Short wire format description, e.g. `fixed(2)` or `compound[8:fixed(2) 7:repetitive(6)]`.
fn describe_kind(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Fixed(n) | FieldKind::Extended(n) | FieldKind::Repetitive(n) => {
            format!("{}({n})", kind.name())
        }
        FieldKind::Compound(layout) => {
            let slots: Vec<String> = (2..=8)
                .rev()
                .filter_map(|slot| {
                    layout
                        .slot(slot)
                        .map(|sub| format!("{slot}:{}", describe_subfield(sub)))
                })
                .collect();
            format!("compound[{}]", slots.join(" "))
        }
        _ => kind.name().to_string(),
    }
}

fn describe_subfield(kind: SubFieldKind) -> String {
    match kind {
        SubFieldKind::Fixed(n) => format!("fixed({n})"),
        SubFieldKind::Extended(n) => format!("extended({n})"),
        SubFieldKind::Explicit => "explicit".to_string(),
        SubFieldKind::Repetitive(n) => format!("repetitive({n})"),
    }
}

fn cmd_config(path: &Path, init: bool, config: &Config) {
    if !init {
        println!("# {}", path.display());
        print!("{}", config.to_text());
        return;
    }

    if path.exists() {
        eprintln!("{} already exists", path.display());
        std::process::exit(1);
    }
    match config::save_config_to(&Config::default(), path) {
        Ok(written) => println!("Wrote {}", written.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
