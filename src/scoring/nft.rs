use crate::models::Assessment;
use crate::scoring::rules::{HealthBands, Rule, RuleSet};

type CollectionRule = Rule<CollectionInput>;

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionInput {
    pub total_supply: Option<u64>,
    pub num_owners: Option<u64>,
}

pub fn collection_rules() -> RuleSet<CollectionInput> {
    RuleSet {
        base: 0,
        rules: vec![
            CollectionRule::new("Relatively low total supply collection.", 2, |c| {
                c.total_supply.map_or(false, |s| s <= 5_000)
            }),
            CollectionRule::new("Moderate total supply.", 1, |c| {
                c.total_supply.map_or(false, |s| s > 5_000 && s <= 20_000)
            }),
            CollectionRule::note("High total supply; may be more diluted.", |c| {
                c.total_supply.map_or(false, |s| s > 20_000)
            }),
            CollectionRule::note("Total supply not reported by contract.", |c| {
                c.total_supply.is_none()
            }),
            CollectionRule::new("Large holder base; widely held.", 2, |c| {
                c.num_owners.map_or(false, |n| n >= 1_000)
            }),
            CollectionRule::new("Moderate number of unique holders.", 1, |c| {
                c.num_owners.map_or(false, |n| (200..1_000).contains(&n))
            }),
            CollectionRule::note("Few holders detected; may be illiquid.", |c| {
                c.num_owners.map_or(false, |n| n < 200)
            }),
            CollectionRule::note("Could not estimate unique holder count.", |c| {
                c.num_owners.is_none()
            }),
        ],
        clamp: None,
        bands: HealthBands {
            good_at_or_above: 4,
            risky_at_or_below: 1,
        },
    }
}

pub fn score_collection(input: CollectionInput) -> Assessment {
    collection_rules().evaluate(&input)
}
