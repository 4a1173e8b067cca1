//! recordkit command-line tool
//!
//! Compiles record schema files and inspects or instantiates the records
//! they declare.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "recordkit")]
#[command(about = "Compile and inspect declarative record schemas", long_about = None)]
#[command(version)]
struct Cli {
    /// Colored output: auto, always or never
    #[arg(long, global = true)]
    color: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every record in a schema file
    Check {
        /// Schema file
        schema: PathBuf,
    },

    /// Show the fields and generated methods of one record
    Describe {
        /// Schema file
        schema: PathBuf,
        /// Record name
        record: String,
    },

    /// Construct an instance of a record
    New {
        /// Schema file
        schema: PathBuf,
        /// Record name
        record: String,
        /// Initializer argument, `name=value`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
        /// Also print a copy with these fields replaced, `name=value`
        #[arg(long = "replace", value_name = "NAME=VALUE")]
        replace: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    match cli.command {
        Commands::Check { schema } => commands::check::execute(&schema, &mut out),
        Commands::Describe { schema, record } => {
            commands::describe::execute(&schema, &record, &mut out)
        }
        Commands::New {
            schema,
            record,
            set,
            replace,
        } => commands::new::execute(&schema, &record, &set, &replace, &mut out),
    }
}
