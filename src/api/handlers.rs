use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    api::{error::ApiError, AppState},
    models::{GuardianError, TokenPortfolio, WalletActivity, BASE_CHAIN},
    social::parse_profile_query,
    utils::resolve_address_or_name,
};

#[derive(Debug, Deserialize)]
pub struct AddressParams {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NftParams {
    pub contract: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn required(value: Option<String>, missing: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(missing.to_string()))
}

/// Loose contract check: `0x` prefix and at least 10 characters
fn looks_like_contract(value: &str) -> bool {
    value.starts_with("0x") && value.len() >= 10
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Activity summary for an address or `.base.eth` / `.eth` name
pub async fn wallet_summary(
    State(state): State<AppState>,
    Query(params): Query<AddressParams>,
) -> Result<impl IntoResponse, ApiError> {
    const FAILURE: &str = "Failed to fetch Base wallet summary";
    let input = required(params.address, "Missing address query param")?;

    let address = resolve_address_or_name(state.resolver.as_ref(), &input)
        .await
        .map_err(|e| {
            error!("Error resolving {}: {}", input, e);
            ApiError::upstream(FAILURE, e)
        })?;

    let summary = state
        .aggregator
        .summarize_cached(&state.cache, &address)
        .await
        .map_err(|e| {
            error!("Error in Base wallet summary for {}: {}", address, e);
            ApiError::upstream(FAILURE, e)
        })?;

    Ok(Json(WalletActivity::new(address, &summary)))
}

pub async fn token_portfolio(
    State(state): State<AppState>,
    Query(params): Query<AddressParams>,
) -> Result<impl IntoResponse, ApiError> {
    let address = required(params.address, "Missing address query param")?;
    if !looks_like_contract(&address) {
        return Err(ApiError::BadRequest(
            "Address must be a valid 0x-prefixed string".to_string(),
        ));
    }

    let tokens = state.portfolio.scan(&address).await.map_err(|e| {
        error!("Error in Base token scan for {}: {}", address, e);
        ApiError::upstream("Failed to scan Base tokens", e)
    })?;

    Ok(Json(TokenPortfolio {
        address,
        chain: BASE_CHAIN.to_string(),
        tokens,
    }))
}

pub async fn token_info(
    State(state): State<AppState>,
    Query(params): Query<AddressParams>,
) -> Result<impl IntoResponse, ApiError> {
    let address = required(params.address, "Missing address query param")?;
    if !looks_like_contract(&address) {
        return Err(ApiError::BadRequest(
            "Address must be a valid 0x-prefixed string".to_string(),
        ));
    }

    match state.token_info.lookup(&address).await {
        Some(info) => Ok(Json(info)),
        None => Err(ApiError::NotFound(
            "Token not found on Base or metadata unavailable".to_string(),
        )),
    }
}

/// Collection summary; accepts `contract` or, failing that, `address`
pub async fn nft_collection(
    State(state): State<AppState>,
    Query(params): Query<NftParams>,
) -> Result<impl IntoResponse, ApiError> {
    let contract = required(
        params.contract.or(params.address),
        "Missing contract query param",
    )?;
    if !looks_like_contract(&contract) {
        return Err(ApiError::BadRequest(
            "Contract must be a valid 0x-prefixed address".to_string(),
        ));
    }

    let summary = state.collections.summarize(&contract).await.map_err(|e| {
        error!("Error in Base NFT summary for {}: {}", contract, e);
        ApiError::upstream("Failed to fetch NFT info from Base", e)
    })?;

    Ok(Json(summary))
}

pub async fn farcaster_profile(
    State(state): State<AppState>,
    Query(params): Query<ProfileParams>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = params.query.unwrap_or_default();
    let raw = match raw.trim() {
        "" => state.default_profile_query.as_str(),
        trimmed => trimmed,
    };
    let query = parse_profile_query(raw);
    info!("Profile lookup for {:?}", query);

    match state.profiles.lookup(&query).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err(ApiError::NotFound("Neynar user not found".to_string())),
        Err(GuardianError::ConfigError(message)) => Err(ApiError::Internal(message)),
        Err(e) => {
            error!("Error fetching Neynar user: {}", e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
