use clap::{Parser, Subcommand};
use base_guardian::{
    api::{create_router, AppState},
    config::Settings,
    models::{TokenPortfolio, WalletActivity, BASE_CHAIN},
    social::parse_profile_query,
    utils::resolve_address_or_name,
};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "base-guardian")]
#[clap(about = "Wallet, token and NFT health checks on Base", long_about = None)]
struct Cli {
    /// Optional settings file layered over the defaults
    #[clap(short, long, global = true)]
    config: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Print the activity summary of an address or .base.eth name
    Wallet { address: String },

    /// Print the ERC-20 portfolio of an address
    Tokens { address: String },

    /// Print market data and health for one token contract
    TokenInfo { contract: String },

    /// Print the summary of an NFT collection
    Nft { contract: String },

    /// Look up a Farcaster profile by fid, username or name
    Profile { query: Option<String> },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_settings(path: Option<&str>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        // logging is not up yet
        None => Settings::new().unwrap_or_else(|e| {
            eprintln!("Using default settings ({})", e);
            Settings::default()
        }),
    };

    settings.validate().map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},base_guardian=debug", settings.app.log_level).into()),
        )
        .init();
    let state = AppState::from_settings(&settings)?;

    match cli.command {
        Commands::Serve { port } => {
            let bind_addr = format!("{}:{}", settings.api.host, port.unwrap_or(settings.api.port));
            let app = create_router(state, &settings.api.cors_origins);

            info!("{} v{} starting", settings.app.name, settings.app.version);
            info!("   • GET /api/base/wallet?address=");
            info!("   • GET /api/base/tokens?address=");
            info!("   • GET /api/base/token-info?address=");
            info!("   • GET /api/base/nft?contract=");
            info!("   • GET /api/neynar/user?query=");
            info!("   • GET /health");

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            info!("Server listening on {}", bind_addr);
            axum::serve(listener, app).await?;
        }

        Commands::Wallet { address } => {
            let resolved = resolve_address_or_name(state.resolver.as_ref(), &address).await?;
            info!("Summarizing {}", resolved);
            let summary = state.aggregator.summarize(&resolved).await?;
            print_json(&WalletActivity::new(resolved, &summary))?;
        }

        Commands::Tokens { address } => {
            let tokens = state.portfolio.scan(&address).await?;
            print_json(&TokenPortfolio {
                address,
                chain: BASE_CHAIN.to_string(),
                tokens,
            })?;
        }

        Commands::TokenInfo { contract } => match state.token_info.lookup(&contract).await {
            Some(info) => print_json(&info)?,
            None => error!("Token not found on Base or metadata unavailable"),
        },

        Commands::Nft { contract } => {
            let summary = state.collections.summarize(&contract).await?;
            print_json(&summary)?;
        }

        Commands::Profile { query } => {
            let raw = query
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| settings.providers.default_profile_query.clone());
            match state.profiles.lookup(&parse_profile_query(&raw)).await? {
                Some(profile) => print_json(&profile)?,
                None => error!("Neynar user not found"),
            }
        }
    }

    Ok(())
}
