use std::collections::BTreeMap;

use serde_json::{json, Value};

/// Dwelling classification supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    Duplex,
    Apartment,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "single_family",
            PropertyType::Duplex => "duplex",
            PropertyType::Apartment => "apartment",
        }
    }
}

/// Construction-year bucket; coarse on purpose since rules only key on eras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearBucket {
    // rename_all does not break before digits, so spell this one out.
    #[serde(rename = "lt_1999")]
    Lt1999,
    Y1999_2010,
    Y2011Plus,
}

impl YearBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            YearBucket::Lt1999 => "lt_1999",
            YearBucket::Y1999_2010 => "y1999_2010",
            YearBucket::Y2011Plus => "y2011_plus",
        }
    }
}

/// Whether existing alarms are interconnected. "unknown" is the default
/// because most callers simply do not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterconnectPresence {
    Yes,
    No,
    #[default]
    Unknown,
}

impl InterconnectPresence {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterconnectPresence::Yes => "yes",
            InterconnectPresence::No => "no",
            InterconnectPresence::Unknown => "unknown",
        }
    }
}

/// Alarm device category a recommendation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmType {
    Smoke,
    Co,
}

/// Placement classes used by rule documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Place {
    EachBedroom,
    OutsideSleepingAreas,
    EachLevelInclBasement,
    NearSleepingAreas,
    CommonHallways,
    Other,
}

impl Place {
    /// Human-readable phrase for rendered checklists.
    pub fn phrase(&self) -> &'static str {
        match self {
            Place::EachBedroom => "inside every bedroom.",
            Place::OutsideSleepingAreas => "outside each sleeping area.",
            Place::EachLevelInclBasement => "on every level, including basements.",
            Place::NearSleepingAreas => "near sleeping areas.",
            Place::CommonHallways => "in common hallways.",
            Place::Other => "as noted.",
        }
    }
}

/// Maintenance action kinds for the testing cadence list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestingActionKind {
    Test,
    Clean,
    ReplaceBattery,
    ReplaceDevice,
}

impl TestingActionKind {
    pub fn phrase(&self) -> &'static str {
        match self {
            TestingActionKind::Test => "Test",
            TestingActionKind::Clean => "Clean",
            TestingActionKind::ReplaceBattery => "Replace battery",
            TestingActionKind::ReplaceDevice => "Replace device",
        }
    }
}

/// How often a testing action recurs. `TenYears` serializes as `10_years`
/// to match existing rule documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestingFrequency {
    Monthly,
    Quarterly,
    Annual,
    #[serde(rename = "10_years")]
    TenYears,
    PerManufacturer,
}

impl TestingFrequency {
    pub fn phrase(&self) -> &'static str {
        match self {
            TestingFrequency::Monthly => "monthly",
            TestingFrequency::Quarterly => "quarterly",
            TestingFrequency::Annual => "annually",
            TestingFrequency::TenYears => "every 10 years",
            TestingFrequency::PerManufacturer => "per manufacturer",
        }
    }
}

/// The caller's property profile: every fact the rule engine can condition on.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PropertyProfile {
    /// Region input, e.g. "US", "CA", "US-CA", or a known state name.
    pub state: String,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub floors: u32,
    pub has_fuel_appliance: bool,
    pub has_attached_garage: bool,
    #[serde(default)]
    pub year_bucket: Option<YearBucket>,
    #[serde(default)]
    pub interconnect_present: InterconnectPresence,
    #[serde(default)]
    pub permit_planned: bool,
}

impl PropertyProfile {
    /// Flatten the profile into the field→value map the condition matcher
    /// evaluates against. Older rule documents key on the combined
    /// `has_fuel_garage` flag, so it is derived here.
    pub fn fact_map(&self) -> BTreeMap<String, Value> {
        let mut facts = BTreeMap::new();
        facts.insert("state".to_string(), json!(self.state));
        facts.insert(
            "property_type".to_string(),
            json!(self.property_type.as_str()),
        );
        facts.insert("bedrooms".to_string(), json!(self.bedrooms));
        facts.insert("floors".to_string(), json!(self.floors));
        facts.insert(
            "has_fuel_appliance".to_string(),
            json!(self.has_fuel_appliance),
        );
        facts.insert(
            "has_attached_garage".to_string(),
            json!(self.has_attached_garage),
        );
        facts.insert(
            "has_fuel_garage".to_string(),
            json!(self.has_fuel_appliance || self.has_attached_garage),
        );
        facts.insert(
            "year_bucket".to_string(),
            match self.year_bucket {
                Some(bucket) => json!(bucket.as_str()),
                None => Value::Null,
            },
        );
        facts.insert(
            "interconnect_present".to_string(),
            json!(self.interconnect_present.as_str()),
        );
        facts.insert("permit_planned".to_string(), json!(self.permit_planned));
        facts
    }
}

/// One merged recommendation: the winning entry for a (type, place) key
/// across the whole jurisdiction chain.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedRecommendation {
    #[serde(rename = "type")]
    pub alarm: AlarmType,
    pub place: Place,
    /// Union of recommendation-level notes from every jurisdiction that
    /// produced this key, first-seen order, deduplicated.
    pub notes: Vec<String>,
    /// Union of citations, first-seen order, deduplicated.
    pub citations: Vec<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
    pub priority: i64,
    /// Jurisdiction that supplied the winning fields.
    pub jurisdiction: String,
}

/// One deduplicated testing-cadence entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestingAction {
    pub action: TestingActionKind,
    pub frequency: TestingFrequency,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
}

/// The assembled output of one resolution call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChecklistPlan {
    pub recommendations: Vec<ResolvedRecommendation>,
    pub testing: Vec<TestingAction>,
    pub notes: Vec<String>,
    pub jurisdiction_chain: Vec<String>,
}

/// Rendered, human-readable checklist produced by the legacy evaluation
/// surface. Kept separate from `ChecklistPlan`; the two contracts version
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ChecklistText {
    pub smoke: Vec<String>,
    pub co: Vec<String>,
    pub devices: Vec<String>,
    pub testing: Vec<String>,
    pub notes: Vec<String>,
    pub citations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> PropertyProfile {
        PropertyProfile {
            state: "US".to_string(),
            property_type: PropertyType::SingleFamily,
            bedrooms: 2,
            floors: 1,
            has_fuel_appliance: false,
            has_attached_garage: true,
            year_bucket: None,
            interconnect_present: InterconnectPresence::Unknown,
            permit_planned: false,
        }
    }

    #[test]
    fn test_fact_map_derives_combined_flag() {
        let facts = profile().fact_map();
        assert_eq!(facts["has_fuel_appliance"], json!(false));
        assert_eq!(facts["has_attached_garage"], json!(true));
        assert_eq!(facts["has_fuel_garage"], json!(true));
    }

    #[test]
    fn test_fact_map_missing_year_bucket_is_null() {
        let facts = profile().fact_map();
        assert_eq!(facts["year_bucket"], Value::Null);
        assert_eq!(facts["interconnect_present"], json!("unknown"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&AlarmType::Co).unwrap(), "\"co\"");
        assert_eq!(
            serde_json::to_string(&Place::EachLevelInclBasement).unwrap(),
            "\"each_level_incl_basement\""
        );
        assert_eq!(
            serde_json::to_string(&TestingFrequency::TenYears).unwrap(),
            "\"10_years\""
        );
        assert_eq!(
            serde_json::to_string(&TestingActionKind::ReplaceBattery).unwrap(),
            "\"replace_battery\""
        );
        assert_eq!(
            serde_json::to_string(&YearBucket::Lt1999).unwrap(),
            "\"lt_1999\""
        );
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let profile: PropertyProfile = serde_json::from_str(
            r#"{
                "state": "US-CA",
                "property_type": "apartment",
                "bedrooms": 1,
                "floors": 3,
                "has_fuel_appliance": true,
                "has_attached_garage": false
            }"#,
        )
        .unwrap();
        assert_eq!(profile.interconnect_present, InterconnectPresence::Unknown);
        assert!(!profile.permit_planned);
        assert_eq!(profile.year_bucket, None);
    }
}
