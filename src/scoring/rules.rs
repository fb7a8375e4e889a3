use crate::models::{Assessment, Health};

/// One scoring condition: when `applies` holds, `delta` is added and
/// `reason` is reported.
pub struct Rule<I> {
    pub reason: &'static str,
    pub delta: i32,
    pub applies: fn(&I) -> bool,
}

impl<I> Rule<I> {
    pub fn new(reason: &'static str, delta: i32, applies: fn(&I) -> bool) -> Self {
        Self {
            reason,
            delta,
            applies,
        }
    }

    /// A rule that only contributes a reason
    pub fn note(reason: &'static str, applies: fn(&I) -> bool) -> Self {
        Self::new(reason, 0, applies)
    }
}

/// Score thresholds mapping a number to a health label
#[derive(Debug, Clone, Copy)]
pub struct HealthBands {
    pub good_at_or_above: i32,
    pub risky_at_or_below: i32,
}

impl HealthBands {
    pub fn classify(&self, score: i32) -> Health {
        if score >= self.good_at_or_above {
            Health::Good
        } else if score <= self.risky_at_or_below {
            Health::Risky
        } else {
            Health::Medium
        }
    }
}

/// Ordered rule list evaluated from a base score
pub struct RuleSet<I> {
    pub base: i32,
    pub rules: Vec<Rule<I>>,
    pub clamp: Option<(i32, i32)>,
    pub bands: HealthBands,
}

impl<I> RuleSet<I> {
    pub fn evaluate(&self, input: &I) -> Assessment {
        let mut score = self.base;
        let mut reasons = Vec::new();

        for rule in self.rules.iter().filter(|r| (r.applies)(input)) {
            score += rule.delta;
            reasons.push(rule.reason.to_string());
        }

        if let Some((min, max)) = self.clamp {
            score = score.clamp(min, max);
        }

        Assessment {
            score,
            health: self.bands.classify(score),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type R = Rule<u32>;

    fn counter_rules() -> RuleSet<u32> {
        RuleSet {
            base: 10,
            rules: vec![
                R::new("big", 50, |n| *n > 100),
                R::new("even", -3, |n| n % 2 == 0),
                R::note("zero", |n| *n == 0),
            ],
            clamp: Some((0, 20)),
            bands: HealthBands {
                good_at_or_above: 15,
                risky_at_or_below: 5,
            },
        }
    }

    #[test]
    fn test_rules_apply_in_order() {
        let assessment = counter_rules().evaluate(&0);
        assert_eq!(assessment.score, 7);
        assert_eq!(assessment.reasons, vec!["even", "zero"]);
        assert_eq!(assessment.health, Health::Medium);
    }

    #[test]
    fn test_clamp_before_classification() {
        let assessment = counter_rules().evaluate(&101);
        assert_eq!(assessment.score, 20);
        assert_eq!(assessment.health, Health::Good);
    }

    #[test]
    fn test_band_edges() {
        let bands = HealthBands {
            good_at_or_above: 2,
            risky_at_or_below: 0,
        };
        assert_eq!(bands.classify(2), Health::Good);
        assert_eq!(bands.classify(1), Health::Medium);
        assert_eq!(bands.classify(0), Health::Risky);
    }
}
