pub mod neynar;

pub use neynar::{parse_profile_query, NeynarClient, ProfileSource, MISSING_KEY_MESSAGE};
