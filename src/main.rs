use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "boxfactory")]
#[command(version, about = "Box inventory service with an end-to-end verification harness")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the inventory server and the embedded search page
    Serve {
        #[arg(short, long, default_value_t = boxfactory::config::DEFAULT_API_PORT)]
        port: u16,
        /// Keep inventory in memory instead of Postgres
        #[arg(long)]
        in_memory: bool,
        /// Pin Access-Control-Allow-Origin to one site instead of answering any
        #[arg(long)]
        origin: Option<String>,
        /// Open the search page in a browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// Drop and recreate the box_factory schema
    Rebuild,
    /// Fill the table with the canonical inventory
    Seed {
        #[arg(long, default_value_t = boxfactory::harness::fixture::SEED_COUNT)]
        count: i32,
    },
    /// Verify a running server end to end: database, REST, CORS, browser
    Verify {
        /// Server under test; defaults to API_BASE_URL or localhost:5000
        #[arg(long)]
        base_url: Option<String>,
        /// Skip the browser stage (no WebDriver needed)
        #[arg(long)]
        skip_ui: bool,
        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve {
            port,
            in_memory,
            origin,
            open,
        } => {
            cmd::cmd_serve(*port, *in_memory, origin.clone(), *open).await?;
        }
        Commands::Rebuild => cmd::cmd_rebuild().await?,
        Commands::Seed { count } => cmd::cmd_seed(*count).await?,
        Commands::Verify {
            base_url,
            skip_ui,
            headed,
        } => {
            cmd::cmd_verify(base_url.clone(), *skip_ui, *headed).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
