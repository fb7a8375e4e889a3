use serde::{Deserialize, Serialize};

/// Parsed form of a profile query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileQuery {
    Fid(u64),
    Username(String),
}

/// Farcaster profile fields returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarcasterProfile {
    pub fid: Option<u64>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    /// Neynar user score, 0..1
    pub neynar_score: Option<f64>,
}
