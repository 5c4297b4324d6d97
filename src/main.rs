use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lead_qualifier::qualifier::config::Settings;
use lead_qualifier::qualifier::server::{self, AppState};
use lead_qualifier::qualifier::store::{LeadStore, SqliteLeadStore};
use lead_qualifier::qualifier::workflow::LeadInput;
use std::net::IpAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the qualification API
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Lead database URL (overrides DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Qualify a single lead and print the result
    Qualify {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        message: String,

        /// Keep the result out of the lead database
        #[arg(long)]
        no_store: bool,
    },
    /// List the most recently stored leads
    Leads {
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

async fn open_store(settings: &Settings, ephemeral: bool) -> anyhow::Result<Arc<dyn LeadStore>> {
    let store = if ephemeral {
        SqliteLeadStore::in_memory().await?
    } else {
        SqliteLeadStore::connect(&settings.database_url).await?
    };
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = Settings::from_env()?;

    match args.command {
        Commands::Serve {
            host,
            port,
            database_url,
        } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(url) = database_url {
                settings.database_url = url;
            }

            let store = open_store(&settings, false).await?;
            let state = AppState::from_settings(&settings, store)?;
            server::serve(settings.socket_addr(), state).await?;
        }
        Commands::Qualify {
            name,
            email,
            message,
            no_store,
        } => {
            let store = open_store(&settings, no_store).await?;
            let state = AppState::from_settings(&settings, store)?;
            let output = server::process_lead(&state, LeadInput::new(name, email, message)).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Leads { limit } => {
            let store = open_store(&settings, false).await?;
            for lead in store.recent(limit).await? {
                println!(
                    "#{} [{}] {} <{}> {} score={}",
                    lead.id,
                    lead.timestamp,
                    lead.name,
                    lead.email,
                    lead.classification,
                    lead.score.map_or_else(|| "-".to_string(), |s| s.to_string())
                );
            }
        }
    }

    Ok(())
}
