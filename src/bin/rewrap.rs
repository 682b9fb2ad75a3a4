use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rewrap::batch::{self, BatchConfig, UploadTarget};
use rewrap::ddl::table_statement;
use rewrap::schema::infer_schema_from_dir;
use rewrap::store::DirObjectStore;
use rewrap::utils::{readable_time, timestamp};
use rewrap::RunContext;

#[derive(Debug, Parser)]
#[command(
    name = "rewrap",
    disable_help_subcommand = true,
    about = "Normalize polymorphic JSON array fields against a corpus schema",
    long_about = "Walk a source tree of JSON documents, wrap bare string elements of \
                  flagged array fields into {\"text\": [..]} records, and write the \
                  normalized documents to a mirrored destination tree.",
    after_help = "Set RUST_LOG=rewrap=debug for per-document detail."
)]
struct RewrapCli {
    #[arg(
        long = "source-dir",
        value_name = "DIR",
        help = "Directory tree of source JSON documents"
    )]
    source_dir: PathBuf,
    #[arg(
        long = "dest-dir",
        value_name = "DIR",
        help = "Destination directory, recreated on every run"
    )]
    dest_dir: PathBuf,
    #[arg(
        long = "schema-path",
        value_name = "FILE",
        help = "Representative corpus schema used to flag candidate paths"
    )]
    schema_path: PathBuf,
    #[arg(
        long = "upload-root",
        value_name = "DIR",
        help = "Optional object-store root to push rewritten documents into"
    )]
    upload_root: Option<PathBuf>,
    #[arg(
        long = "upload-prefix",
        value_name = "PREFIX",
        default_value = "",
        requires = "upload_root",
        help = "Key prefix for uploaded documents"
    )]
    upload_prefix: String,
    #[arg(
        long = "ddl-out",
        value_name = "FILE",
        help = "Optional path for the derived CREATE TABLE statement"
    )]
    ddl_out: Option<PathBuf>,
    #[arg(
        long = "summary-out",
        value_name = "FILE",
        help = "Optional path for the JSON run summary"
    )]
    summary_out: Option<PathBuf>,
    #[arg(
        long,
        value_name = "NAME",
        default_value = "corpus",
        help = "Table name used in the derived statement"
    )]
    table: String,
    #[arg(
        long = "data-location",
        value_name = "URI",
        default_value = "",
        help = "LOCATION clause for the derived statement"
    )]
    data_location: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = RewrapCli::parse();

    let ctx = RunContext::create()?;
    let config = BatchConfig {
        source_dir: cli.source_dir,
        dest_dir: cli.dest_dir.clone(),
        schema_path: cli.schema_path,
        upload: cli.upload_root.map(|root| UploadTarget {
            store: Arc::new(DirObjectStore::new(root)),
            key_prefix: cli.upload_prefix.clone(),
        }),
    };

    let summary = batch::run(&ctx, &config)?;
    println!("run started: {}", timestamp(summary.started_at));
    println!("success: {}", summary.success);
    println!("failed: {}", summary.failed);
    println!(
        "total time: {}",
        readable_time(summary.elapsed.as_secs_f64())
    );

    if let Some(summary_out) = cli.summary_out {
        fs::write(&summary_out, serde_json::to_string_pretty(&summary)?)?;
        println!("run summary written to {}", summary_out.display());
    }

    if let Some(ddl_out) = cli.ddl_out {
        let schema = infer_schema_from_dir(&cli.dest_dir)?;
        let statement = table_statement(&cli.table, &schema, &cli.data_location, false)?;
        fs::write(&ddl_out, statement)?;
        println!("table statement written to {}", ddl_out.display());
    }

    Ok(())
}
