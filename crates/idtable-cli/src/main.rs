use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use idtable_core::Caller;

mod commands;

#[derive(Parser)]
#[command(
    name = "idtable",
    about = "idtable — keyed user-identity store",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to an idtable.toml configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the database file (overrides [store].path's directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Use a throwaway in-memory store (useful with `batch`)
    #[arg(long, global = true)]
    in_memory: bool,
    /// Identity to attribute requests to
    #[arg(long = "as", value_name = "CALLER", global = true)]
    caller: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the UserIdentity table (once per store)
    Init,
    /// Run a mutating command: `create <user>` or `update <user> <status>`
    Invoke {
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run a read-only command: `query <user>`
    Query {
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the stored schema descriptor as JSON
    Schema,
    /// Run `init` / `invoke` / `query` lines from a file or stdin
    Batch {
        /// Script file (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "warn,idtable=info,idtable_router=info,idtable_state=info",
                )
            }),
        )
        .init();

    let cli = Cli::parse();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.data_dir.as_deref(),
        cli.in_memory,
    )?;
    let router = commands::open_router(&config)?;
    let caller = cli.caller.map(Caller::named).unwrap_or_default();
    let mut out = io::stdout().lock();

    let result = match cli.command {
        Commands::Init => commands::ops::init(&router, &mut out),
        Commands::Invoke { name, args } => {
            commands::ops::invoke(&router, &caller, &name, &args, &mut out)
        }
        Commands::Query { name, args } => {
            commands::ops::query(&router, &caller, &name, &args, &mut out)
        }
        Commands::Schema => commands::ops::schema(&router, &mut out),
        Commands::Batch { file } => {
            let summary = match file {
                Some(path) => {
                    let reader = BufReader::new(std::fs::File::open(&path)?);
                    commands::batch::run(&router, &caller, reader, &mut out)?
                }
                None => commands::batch::run(&router, &caller, io::stdin().lock(), &mut out)?,
            };
            summary.into_result()
        }
    };

    router.close();
    result
}
