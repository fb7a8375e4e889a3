pub mod error;
pub mod handlers;

use axum::{http::HeaderValue, http::Method, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    activity::WalletActivityAggregator,
    chains::{client::ChainClientConfig, AlchemyRpcClient, RpcTransport},
    config::{RpcConfig, Settings},
    models::{GuardianError, Result, SummaryCache},
    nft::CollectionScanner,
    social::{NeynarClient, ProfileSource},
    tokens::{AlchemyPriceClient, DexScreenerClient, PortfolioScanner, TokenInfoService},
    utils::{EnsResolver, NameResolver},
};

pub use error::ApiError;
use handlers::*;

/// Shared handler state; every collaborator is behind an `Arc`
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn NameResolver>,
    pub aggregator: Arc<WalletActivityAggregator>,
    pub cache: SummaryCache,
    pub portfolio: Arc<PortfolioScanner>,
    pub token_info: Arc<TokenInfoService>,
    pub collections: Arc<CollectionScanner>,
    pub profiles: Arc<dyn ProfileSource>,
    pub default_profile_query: String,
}

impl AppState {
    /// Wire the production clients from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let rpc_config = RpcConfig::from_settings(settings);

        let http_client = reqwest::Client::builder()
            .timeout(rpc_config.timeout())
            .build()
            .map_err(|e| GuardianError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let alchemy = AlchemyRpcClient::new(ChainClientConfig {
            rpc_url: rpc_config.base_rpc_url.clone(),
            timeout_seconds: rpc_config.timeout_seconds,
        })?;
        if !alchemy.is_configured() {
            warn!("ALCHEMY_BASE_API_KEY is not set; chain endpoints will fail");
        }
        let rpc: Arc<dyn RpcTransport> = Arc::new(alchemy);

        let prices = Arc::new(AlchemyPriceClient::new(
            http_client.clone(),
            rpc_config.prices_url.clone(),
        ));
        let market = Arc::new(DexScreenerClient::new(
            http_client.clone(),
            rpc_config.dexscreener_base_url.clone(),
        ));
        let profiles = NeynarClient::new(
            http_client,
            rpc_config.neynar_base_url.clone(),
            settings.providers.neynar_api_key.clone(),
        );
        if !profiles.is_configured() {
            warn!("NEYNAR_API_KEY is not set; profile lookups will fail");
        }

        Ok(Self {
            resolver: Arc::new(EnsResolver::new(rpc_config.base_rpc_url.as_deref())?),
            aggregator: Arc::new(WalletActivityAggregator::new(
                rpc.clone(),
                settings.activity.clone(),
            )),
            cache: SummaryCache::new(settings.summary_ttl()),
            portfolio: Arc::new(PortfolioScanner::new(
                rpc.clone(),
                prices,
                settings.tokens.portfolio_limit,
            )),
            token_info: Arc::new(TokenInfoService::new(rpc.clone(), market)),
            collections: Arc::new(CollectionScanner::new(rpc, settings.nft.clone())),
            profiles: Arc::new(profiles),
            default_profile_query: settings.providers.default_profile_query.clone(),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    info!("Registering routes");

    Router::new()
        .route("/health", get(health_check))
        .route("/api/base/wallet", get(wallet_summary))
        .route("/api/base/tokens", get(token_portfolio))
        .route("/api/base/token-info", get(token_info))
        .route("/api/base/nft", get(nft_collection))
        .route("/api/neynar/user", get(farcaster_profile))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
