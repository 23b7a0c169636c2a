//! Priority classification of areas.
//!
//! An area's tier is a pure function of its facility counts and population,
//! driven entirely by [`ClassifierConfig`] so operators can retune the policy
//! without code changes.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::topology::{Area, ClassifiedArea};

/// Discrete criticality rank; lower number is more critical
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(into = "u8", try_from = "u8")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum PriorityTier {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl PriorityTier {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Whether areas of this tier may ever be disconnected
    pub fn is_sheddable(self) -> bool {
        self != Self::Critical
    }

    /// Sheddable tiers in cutting order, least critical first
    pub fn shedding_order() -> impl Iterator<Item = Self> {
        Self::iter().rev().filter(|tier| tier.is_sheddable())
    }
}

impl From<PriorityTier> for u8 {
    fn from(tier: PriorityTier) -> Self {
        tier.level()
    }
}

impl TryFrom<u8> for PriorityTier {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Critical),
            2 => Ok(Self::High),
            3 => Ok(Self::Medium),
            4 => Ok(Self::Low),
            other => Err(format!("priority tier must be between 1 and 4, got {other}")),
        }
    }
}

/// Number of areas in each tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn add(&mut self, tier: PriorityTier) {
        *self.slot(tier) += 1;
    }

    pub fn get(&self, tier: PriorityTier) -> usize {
        match tier {
            PriorityTier::Critical => self.critical,
            PriorityTier::High => self.high,
            PriorityTier::Medium => self.medium,
            PriorityTier::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    fn slot(&mut self, tier: PriorityTier) -> &mut usize {
        match tier {
            PriorityTier::Critical => &mut self.critical,
            PriorityTier::High => &mut self.high,
            PriorityTier::Medium => &mut self.medium,
            PriorityTier::Low => &mut self.low,
        }
    }
}

impl<'a> FromIterator<&'a ClassifiedArea> for TierCounts {
    fn from_iter<I: IntoIterator<Item = &'a ClassifiedArea>>(iter: I) -> Self {
        let mut counts = Self::default();
        for area in iter {
            counts.add(area.priority);
        }
        counts
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Facility count that promotes an area to `tier`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacilityRule {
    pub tier: PriorityTier,
    /// Minimum number of facilities for the rule to apply (>= 1)
    pub min_count: u32,
}

impl FacilityRule {
    pub const fn new(tier: PriorityTier, min_count: u32) -> Self {
        Self { tier, min_count }
    }

    fn applies(&self, count: u32) -> bool {
        count >= self.min_count
    }
}

/// Population above which an area counts as high density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRule {
    pub tier: PriorityTier,
    pub population_above: u64,
}

/// Classification policy.
///
/// A rule whose tier is `4` has no effect, which is how a rule is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub hospitals: FacilityRule,
    pub emergency_services: FacilityRule,
    pub research_centers: FacilityRule,
    pub schools: FacilityRule,
    pub high_density: DensityRule,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            hospitals: FacilityRule::new(PriorityTier::Critical, 1),
            emergency_services: FacilityRule::new(PriorityTier::Critical, 1),
            research_centers: FacilityRule::new(PriorityTier::High, 1),
            schools: FacilityRule::new(PriorityTier::Medium, 1),
            high_density: DensityRule {
                tier: PriorityTier::Medium,
                population_above: 10_000,
            },
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), String> {
        let rules = [
            ("hospitals", &self.hospitals),
            ("emergency_services", &self.emergency_services),
            ("research_centers", &self.research_centers),
            ("schools", &self.schools),
        ];
        for (name, rule) in rules {
            if rule.min_count == 0 {
                return Err(format!("classifier.{name}.min_count must be at least 1"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Derives an area's priority tier from its attributes
#[derive(Debug, Clone, Default)]
pub struct PriorityClassifier {
    config: ClassifierConfig,
}

impl PriorityClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Most critical tier among the rules that apply; tier 4 when none do
    pub fn classify(&self, area: &Area) -> PriorityTier {
        let cfg = &self.config;
        let facilities = &area.facilities;

        let facility_tiers = [
            (facilities.hospitals, cfg.hospitals),
            (facilities.emergency_services, cfg.emergency_services),
            (facilities.research_centers, cfg.research_centers),
            (facilities.schools, cfg.schools),
        ]
        .into_iter()
        .filter(|(count, rule)| rule.applies(*count))
        .map(|(_, rule)| rule.tier);

        let density_tier = (area.population > cfg.high_density.population_above)
            .then_some(cfg.high_density.tier);

        facility_tiers
            .chain(density_tier)
            .min()
            .unwrap_or(PriorityTier::Low)
    }

    pub fn classify_area(&self, area: Area) -> ClassifiedArea {
        let priority = self.classify(&area);
        ClassifiedArea { area, priority }
    }

    pub fn classify_all<'a>(&self, areas: impl IntoIterator<Item = &'a Area>) -> Vec<ClassifiedArea> {
        areas
            .into_iter()
            .map(|area| self.classify_area(area.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::FacilityCounts;
    use crate::domain::types::{AreaId, FeederId};
    use proptest::prelude::*;
    use rstest::rstest;

    fn area(population: u64, facilities: FacilityCounts) -> Area {
        Area {
            id: AreaId(1),
            feeder_id: FeederId(1),
            name: "Test".into(),
            load_kw: 100.0,
            population,
            facilities,
        }
    }

    fn facilities(hospitals: u32, emergency: u32, research: u32, schools: u32) -> FacilityCounts {
        FacilityCounts {
            hospitals,
            emergency_services: emergency,
            research_centers: research,
            schools,
        }
    }

    #[rstest]
    #[case::empty(0, facilities(0, 0, 0, 0), PriorityTier::Low)]
    #[case::hospital(0, facilities(1, 0, 0, 0), PriorityTier::Critical)]
    #[case::emergency(0, facilities(0, 2, 0, 0), PriorityTier::Critical)]
    #[case::research(0, facilities(0, 0, 1, 0), PriorityTier::High)]
    #[case::school(0, facilities(0, 0, 0, 1), PriorityTier::Medium)]
    #[case::dense(10_001, facilities(0, 0, 0, 0), PriorityTier::Medium)]
    #[case::at_threshold(10_000, facilities(0, 0, 0, 0), PriorityTier::Low)]
    #[case::hospital_wins_over_school(50_000, facilities(1, 0, 0, 3), PriorityTier::Critical)]
    #[case::research_wins_over_school(0, facilities(0, 0, 1, 1), PriorityTier::High)]
    fn test_default_policy(#[case] population: u64, #[case] facilities: FacilityCounts, #[case] expected: PriorityTier) {
        let classifier = PriorityClassifier::default();
        assert_eq!(classifier.classify(&area(population, facilities)), expected);
    }

    #[test]
    fn test_policy_is_configurable() {
        let classifier = PriorityClassifier::new(ClassifierConfig {
            schools: FacilityRule::new(PriorityTier::High, 3),
            high_density: DensityRule {
                tier: PriorityTier::Medium,
                population_above: 500,
            },
            ..Default::default()
        });

        // two schools no longer qualify for the school rule, but density still applies
        assert_eq!(classifier.classify(&area(600, facilities(0, 0, 0, 2))), PriorityTier::Medium);
        assert_eq!(classifier.classify(&area(0, facilities(0, 0, 0, 3))), PriorityTier::High);
        assert_eq!(classifier.classify(&area(100, facilities(0, 0, 0, 2))), PriorityTier::Low);
    }

    #[test]
    fn test_config_rejects_zero_min_count() {
        let config = ClassifierConfig {
            research_centers: FacilityRule::new(PriorityTier::High, 0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(ClassifierConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tier_serializes_as_level() {
        assert_eq!(serde_json::to_string(&PriorityTier::Medium).unwrap(), "3");
        let tier: PriorityTier = serde_json::from_str("2").unwrap();
        assert_eq!(tier, PriorityTier::High);
        assert!(serde_json::from_str::<PriorityTier>("5").is_err());
    }

    #[test]
    fn test_shedding_order_is_least_critical_first() {
        let order: Vec<_> = PriorityTier::shedding_order().collect();
        assert_eq!(order, vec![PriorityTier::Low, PriorityTier::Medium, PriorityTier::High]);
    }

    #[test]
    fn test_tier_counts() {
        let classifier = PriorityClassifier::default();
        let areas = [
            area(0, facilities(1, 0, 0, 0)),
            area(0, facilities(0, 0, 0, 0)),
            area(0, facilities(0, 0, 0, 0)),
        ];
        let classified = classifier.classify_all(&areas);
        let counts: TierCounts = classified.iter().collect();
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.low, 2);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(PriorityTier::High), 0);
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic_and_total(
            population in 0u64..1_000_000,
            hospitals in 0u32..4,
            emergency in 0u32..4,
            research in 0u32..4,
            schools in 0u32..4,
        ) {
            let classifier = PriorityClassifier::default();
            let subject = area(population, facilities(hospitals, emergency, research, schools));
            let first = classifier.classify(&subject);
            prop_assert_eq!(first, classifier.classify(&subject));
            prop_assert!((1..=4).contains(&first.level()));
            if hospitals > 0 || emergency > 0 {
                prop_assert_eq!(first, PriorityTier::Critical);
            }
        }
    }
}
