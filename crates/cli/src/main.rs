use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commons_core::config::RunConfig;
use commons_core::fetch::HttpSource;
use commons_core::ingest;
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;
use tabular::votefiles::{OutputPaths, write_outputs};
use tracing::info;

mod logging;

#[derive(Parser)]
#[command(name = "votematrix")]
#[command(about = "Commons division vote matrix builder", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch divisions, aggregate votes and write the matrix and member files
    Build(BuildArgs),
    /// Export JSON Schemas for the accepted API documents
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for the division and member documents
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// TOML config file; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for the TSV files
    #[arg(long)]
    output: Option<PathBuf>,

    /// First division id to fetch
    #[arg(long)]
    from: Option<u32>,

    /// Division id to stop before
    #[arg(long)]
    to: Option<u32>,

    /// Earliest division date to keep (YYYY-MM-DD)
    #[arg(long)]
    since: Option<String>,

    /// Latest division date to keep (YYYY-MM-DD)
    #[arg(long)]
    until: Option<String>,

    /// Votes API base URL
    #[arg(long)]
    api_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl BuildArgs {
    fn resolve(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(from) = self.from {
            config.division_start = from;
        }
        if let Some(to) = self.to {
            config.division_end = to;
        }
        if let Some(since) = self.since {
            config.date_start = since;
        }
        if let Some(until) = self.until {
            config.date_end = until;
        }
        if let Some(url) = self.api_base_url {
            config.api_base_url = url;
        }
        if let Some(secs) = self.timeout_secs {
            config.http_timeout_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Build(args) => build(args.resolve()?),
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
    }
}

fn build(config: RunConfig) -> Result<()> {
    let ids = config.division_ids()?;
    let dates = config.date_range()?;
    let source = HttpSource::new(config.api_base_url.clone(), config.http_timeout()?)?;

    let run = ingest::run(&source, ids, &dates);
    let matrix = run.matrix();

    let paths = OutputPaths::new(&config.output_dir, &config.matrix_file, &config.members_file);
    write_outputs(&paths, &matrix, run.aggregator.members(), &config.member_url)?;

    for failure in &run.report.failures {
        info!(
            division_id = failure.division_id,
            kind = %failure.kind,
            "not included: {}",
            failure.message
        );
    }

    println!("Processed {} divisions", run.aggregator.divisions().len());
    println!("Tracked {} members", run.aggregator.members().len());
    let report = &run.report;
    let skipped = report.failures.len() + report.filtered_out + report.duplicate_divisions.len();
    println!(
        "Skipped {} ids ({} outside date range, {} duplicate)",
        skipped,
        report.filtered_out,
        report.duplicate_divisions.len()
    );
    println!("Vote conflicts: {}", report.vote_conflicts);
    println!("Written {}", paths.matrix.display());
    println!("Written {}", paths.members.display());
    Ok(())
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    // Export DivisionDocument schema
    let division_schema = schema_for!(commons_core::schema::DivisionDocument);
    let division_json = serde_json::to_string_pretty(&division_schema)?;
    fs::write(out_dir.join("DivisionDocument.schema.json"), division_json)?;

    // Export MemberDocument schema
    let member_schema = schema_for!(commons_core::schema::MemberDocument);
    let member_json = serde_json::to_string_pretty(&member_schema)?;
    fs::write(out_dir.join("MemberDocument.schema.json"), member_json)?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}
