use serde::{Deserialize, Serialize};

/// Three-level advisory label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Good,
    Medium,
    Risky,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Good => "good",
            Health::Medium => "medium",
            Health::Risky => "risky",
        }
    }
}

/// Result of running a rule set over one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: i32,
    pub health: Health,
    pub reasons: Vec<String>,
}
