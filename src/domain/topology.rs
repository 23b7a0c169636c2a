use serde::{Deserialize, Serialize};

use super::priority::PriorityTier;
use super::types::{is_non_negative, AreaId, FeederId};
use crate::error::{PlannerError, PlannerResult};

/// Longest accepted feeder/area name
pub const MAX_NAME_LEN: usize = 120;

/// Distribution line segment supplying one or more areas from the plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feeder {
    pub id: FeederId,
    pub name: String,
    pub capacity_kw: f64,
}

/// Critical facilities located in an area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityCounts {
    pub hospitals: u32,
    pub emergency_services: u32,
    pub research_centers: u32,
    pub schools: u32,
}

/// Consumer zone served by exactly one feeder.
///
/// Carries no priority tier: the tier is derived by the classifier
/// on every read (see [`ClassifiedArea`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub feeder_id: FeederId,
    pub name: String,
    pub load_kw: f64,
    pub population: u64,
    #[serde(flatten)]
    pub facilities: FacilityCounts,
}

/// Area paired with the tier derived from its current attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedArea {
    #[serde(flatten)]
    pub area: Area,
    pub priority: PriorityTier,
}

impl ClassifiedArea {
    pub fn id(&self) -> AreaId {
        self.area.id
    }

    pub fn load_kw(&self) -> f64 {
        self.area.load_kw
    }

    /// Tier 1 areas are never cut
    pub fn is_sheddable(&self) -> bool {
        self.priority.is_sheddable()
    }
}

/// Area listing row: classified area plus the owning feeder's name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaView {
    #[serde(flatten)]
    pub area: ClassifiedArea,
    pub feeder_name: String,
}

// ============================================================================
// Mutation Inputs
// ============================================================================

/// Input for creating a feeder
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeeder {
    pub name: String,
    /// Falls back to the configured default capacity when absent
    pub capacity_kw: Option<f64>,
}

impl NewFeeder {
    pub fn new(name: impl Into<String>, capacity_kw: Option<f64>) -> Self {
        Self {
            name: name.into(),
            capacity_kw,
        }
    }

    /// Validate and build the record to insert
    pub(crate) fn into_feeder(self, id: FeederId, default_capacity_kw: f64) -> PlannerResult<Feeder> {
        let name = normalized_name("name", &self.name)?;
        let capacity_kw = checked_kw("capacity_kw", self.capacity_kw.unwrap_or(default_capacity_kw))?;
        Ok(Feeder {
            id,
            name,
            capacity_kw,
        })
    }
}

/// Input for creating an area
#[derive(Debug, Clone, PartialEq)]
pub struct NewArea {
    pub feeder_id: FeederId,
    pub name: String,
    pub load_kw: f64,
    pub population: u64,
    pub facilities: FacilityCounts,
}

impl NewArea {
    pub(crate) fn into_area(self, id: AreaId) -> PlannerResult<Area> {
        Ok(Area {
            id,
            feeder_id: self.feeder_id,
            name: normalized_name("name", &self.name)?,
            load_kw: checked_kw("load_kw", self.load_kw)?,
            population: self.population,
            facilities: self.facilities,
        })
    }
}

/// Partial update of an area; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaUpdate {
    pub feeder_id: Option<FeederId>,
    pub name: Option<String>,
    pub load_kw: Option<f64>,
    pub population: Option<u64>,
    pub facilities: Option<FacilityCounts>,
}

impl AreaUpdate {
    /// Produce the updated record without touching `current`, so a failed
    /// validation leaves the stored area unchanged
    pub(crate) fn applied_to(&self, current: &Area) -> PlannerResult<Area> {
        let mut next = current.clone();
        if let Some(feeder_id) = self.feeder_id {
            next.feeder_id = feeder_id;
        }
        if let Some(name) = &self.name {
            next.name = normalized_name("name", name)?;
        }
        if let Some(load_kw) = self.load_kw {
            next.load_kw = checked_kw("load_kw", load_kw)?;
        }
        if let Some(population) = self.population {
            next.population = population;
        }
        if let Some(facilities) = self.facilities {
            next.facilities = facilities;
        }
        Ok(next)
    }
}

/// Trim a name and reject blank or oversized values
pub fn normalized_name(field: &'static str, raw: &str) -> PlannerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::validation(field, "must not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(PlannerError::validation(
            field,
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Reject negative, NaN and infinite power figures
pub fn checked_kw(field: &'static str, value: f64) -> PlannerResult<f64> {
    if is_non_negative(value) {
        Ok(value)
    } else {
        Err(PlannerError::validation(
            field,
            format!("must be a finite value >= 0, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Area {
        Area {
            id: AreaId(1),
            feeder_id: FeederId(1),
            name: "Harbour".into(),
            load_kw: 120.0,
            population: 800,
            facilities: FacilityCounts::default(),
        }
    }

    #[test]
    fn test_new_feeder_trims_name_and_defaults_capacity() {
        let feeder = NewFeeder::new("  North ", None)
            .into_feeder(FeederId(1), 1000.0)
            .unwrap();
        assert_eq!(feeder.name, "North");
        assert_eq!(feeder.capacity_kw, 1000.0);
    }

    #[test]
    fn test_new_feeder_rejects_negative_capacity() {
        let err = NewFeeder::new("North", Some(-5.0))
            .into_feeder(FeederId(1), 1000.0)
            .unwrap_err();
        assert_eq!(err.field(), Some("capacity_kw"));
    }

    #[test]
    fn test_new_area_rejects_blank_name_and_nan_load() {
        let base = NewArea {
            feeder_id: FeederId(1),
            name: "   ".into(),
            load_kw: 10.0,
            population: 0,
            facilities: FacilityCounts::default(),
        };
        assert_eq!(base.clone().into_area(AreaId(1)).unwrap_err().field(), Some("name"));

        let nan = NewArea {
            name: "Docks".into(),
            load_kw: f64::NAN,
            ..base
        };
        assert_eq!(nan.into_area(AreaId(1)).unwrap_err().field(), Some("load_kw"));
    }

    #[test]
    fn test_update_leaves_original_untouched_on_error() {
        let current = area();
        let update = AreaUpdate {
            load_kw: Some(-1.0),
            population: Some(99),
            ..Default::default()
        };
        assert!(update.applied_to(&current).is_err());
        assert_eq!(current.population, 800);
    }

    #[test]
    fn test_update_applies_present_fields_only() {
        let update = AreaUpdate {
            load_kw: Some(60.0),
            facilities: Some(FacilityCounts {
                schools: 2,
                ..Default::default()
            }),
            ..Default::default()
        };
        let next = update.applied_to(&area()).unwrap();
        assert_eq!(next.load_kw, 60.0);
        assert_eq!(next.facilities.schools, 2);
        assert_eq!(next.name, "Harbour");
    }

    #[test]
    fn test_area_serializes_facilities_inline() {
        let json = serde_json::to_value(area()).unwrap();
        assert_eq!(json["hospitals"], 0);
        assert_eq!(json["feeder_id"], 1);
    }

    #[test]
    fn test_name_length_limit() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(normalized_name("name", &long).is_err());
        assert!(normalized_name("name", &long[..MAX_NAME_LEN]).is_ok());
    }
}
