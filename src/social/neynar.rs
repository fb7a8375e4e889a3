use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use crate::models::{FarcasterProfile, GuardianError, ProfileQuery, Result};

const SERVICE: &str = "Neynar";
pub const MISSING_KEY_MESSAGE: &str = "NEYNAR_API_KEY is not configured on the server";

const SUFFIXES: [&str; 2] = [".base.eth", ".farcaster.eth"];

/// Interpret a free-form profile query: fid digits, `@handle`, or a
/// `.base.eth` / `.farcaster.eth` name.
pub fn parse_profile_query(raw: &str) -> ProfileQuery {
    let mut query = raw.trim();

    let lower = query.to_lowercase();
    if let Some(suffix) = SUFFIXES.iter().find(|s| lower.ends_with(*s)) {
        query = query.get(..query.len() - suffix.len()).unwrap_or(query);
    }
    let query = query.strip_prefix('@').unwrap_or(query);

    if !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(fid) = query.parse() {
            return ProfileQuery::Fid(fid);
        }
    }
    ProfileQuery::Username(query.to_lowercase())
}

/// Profile lookups by fid or username
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn lookup(&self, query: &ProfileQuery) -> Result<Option<FarcasterProfile>>;
}

pub struct NeynarClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Status and parsed body of one Neynar request; the body is `None` when
/// it is not JSON.
struct NeynarReply {
    ok: bool,
    body: Option<Value>,
}

impl NeynarClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get(&self, api_key: &str, path: &str, query: &[(&str, &str)]) -> Result<NeynarReply> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Neynar GET {}", path);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header("accept", "application/json")
            .header("x-api-key", api_key)
            .send()
            .await?;

        let ok = response.status().is_success();
        let body = response.json::<Value>().await.ok();
        Ok(NeynarReply { ok, body })
    }

    async fn by_fid(&self, api_key: &str, fid: u64) -> Result<Option<FarcasterProfile>> {
        let fid = fid.to_string();
        let reply = self.get(api_key, "user/bulk", &[("fids", fid.as_str())]).await?;

        if !reply.ok {
            return upstream_failure("fid lookup", reply.body.as_ref());
        }
        Ok(reply.body.as_ref().and_then(single_user).map(map_user))
    }

    async fn by_username(&self, api_key: &str, username: &str) -> Result<Option<FarcasterProfile>> {
        let reply = self
            .get(api_key, "user/by-username", &[("username", username)])
            .await?;
        if reply.ok {
            if let Some(user) = reply.body.as_ref().and_then(single_user) {
                return Ok(Some(map_user(user)));
            }
        }

        let reply = self
            .get(api_key, "user/search", &[("q", username), ("limit", "1")])
            .await?;
        if !reply.ok {
            return upstream_failure("username search", reply.body.as_ref());
        }

        Ok(reply
            .body
            .as_ref()
            .and_then(|b| b.pointer("/result/users/0"))
            .filter(|u| u.is_object())
            .map(map_user))
    }
}

#[async_trait]
impl ProfileSource for NeynarClient {
    async fn lookup(&self, query: &ProfileQuery) -> Result<Option<FarcasterProfile>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GuardianError::ConfigError(MISSING_KEY_MESSAGE.to_string()))?;

        match query {
            ProfileQuery::Fid(fid) => self.by_fid(api_key, *fid).await,
            ProfileQuery::Username(name) => self.by_username(api_key, name).await,
        }
    }
}

/// A failed request is an error only when Neynar explains it
fn upstream_failure(what: &str, body: Option<&Value>) -> Result<Option<FarcasterProfile>> {
    error!("Neynar {} failed: {:?}", what, body);
    match body.and_then(|b| b.get("message")).and_then(Value::as_str) {
        Some(message) => Err(GuardianError::upstream(SERVICE, message)),
        None => Ok(None),
    }
}

/// The user object of a bulk or single-user response
fn single_user(body: &Value) -> Option<&Value> {
    ["/users/0", "/result/user", "/user"]
        .iter()
        .find_map(|p| body.pointer(p))
        .filter(|u| u.is_object())
}

const SCORE_PATHS: [&str; 4] = [
    "/neynar_user/score/v1",
    "/neynar_user/influence/score",
    "/neynar_user/score",
    "/experimental/neynar_user_score",
];

pub fn map_user(raw: &Value) -> FarcasterProfile {
    FarcasterProfile {
        fid: raw.get("fid").and_then(Value::as_u64),
        username: raw.get("username").and_then(Value::as_str).map(String::from),
        display_name: raw.get("display_name").and_then(Value::as_str).map(String::from),
        followers: raw.get("follower_count").and_then(Value::as_u64),
        following: raw.get("following_count").and_then(Value::as_u64),
        neynar_score: SCORE_PATHS
            .iter()
            .find_map(|p| raw.pointer(p).and_then(Value::as_f64)),
    }
}
