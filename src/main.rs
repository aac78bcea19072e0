use std::path::PathBuf;

use clap::{Parser, Subcommand};
use promo_tools::pipeline;
use promo_tools::{logging, Result};
use serde::Serialize;

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::BannerByPeriod(args) => {
            let summary = pipeline::banner_by_period(&args.input, args.output.as_deref())?;
            report(&summary, args.stats_json)
        }
        Command::PromotionsWide(args) => {
            let summary =
                pipeline::promotions_wide(&args.input, args.output.as_deref(), &args.drop_code)?;
            report(&summary, args.stats_json)
        }
        Command::FixPromotions(args) => {
            let priority = match &args.priority_file {
                Some(path) => pipeline::load_priority(path)?,
                None => pipeline::default_priority(),
            };
            let summary = pipeline::fix_promotions(
                &args.input,
                args.output.as_deref(),
                &priority,
                args.list_types,
            )?;
            if args.list_types {
                for type_name in &summary.types {
                    println!("{type_name}");
                }
                Ok(())
            } else {
                report(&summary, args.stats_json)
            }
        }
    }
}

fn report<S: Serialize>(summary: &S, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reshape retail CSV exports and normalize promotion codes."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pivot per-period columns into one row per period.
    BannerByPeriod(BannerArgs),
    /// Widen the promotions column into per-code flag columns.
    PromotionsWide(WideArgs),
    /// Deduplicate and reorder free-text promotion history lines.
    FixPromotions(FixArgs),
}

#[derive(clap::Args)]
struct BannerArgs {
    /// Input CSV file path.
    #[arg(long)]
    input: PathBuf,

    /// Output file path. Defaults to `[GENERATED]_<input name>` next to the
    /// input.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    stats_json: bool,
}

#[derive(clap::Args)]
struct WideArgs {
    /// Input CSV file path.
    #[arg(long)]
    input: PathBuf,

    /// Output file path. Defaults to `[GENERATED]_<input name>` next to the
    /// input.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Discovered promotion code to leave out of the output. Repeatable.
    #[arg(long)]
    drop_code: Vec<String>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    stats_json: bool,
}

#[derive(clap::Args)]
struct FixArgs {
    /// Input text file with one comma-separated promotion history per line.
    #[arg(long)]
    input: PathBuf,

    /// Output file path. Defaults to `[GENERATED]_<input name>` next to the
    /// input.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Priority list file, one promotion type per line, most prominent
    /// first. Defaults to the built-in list.
    #[arg(long)]
    priority_file: Option<PathBuf>,

    /// Only print the discovered promotion types, one per line; write no
    /// output.
    #[arg(long)]
    list_types: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    stats_json: bool,
}
