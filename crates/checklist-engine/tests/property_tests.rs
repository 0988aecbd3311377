//! Property-based tests for the resolution laws.
//!
//! These run every law against arbitrary property profiles over the
//! shipped rule documents.

use checklist_engine::ChecklistEngine;
use proptest::prelude::*;
use shared_types::{
    AlarmType, InterconnectPresence, Place, PropertyProfile, PropertyType, YearBucket,
};

fn arb_state() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("US".to_string()),
        Just("CA".to_string()),
        Just("US-CA".to_string()),
        Just("california".to_string()),
        Just("NY".to_string()),
        Just("ZZ".to_string()),
        Just("Atlantis".to_string()),
        "[A-Z]{2}",
    ]
}

fn arb_property_type() -> impl Strategy<Value = PropertyType> {
    prop_oneof![
        Just(PropertyType::SingleFamily),
        Just(PropertyType::Duplex),
        Just(PropertyType::Apartment),
    ]
}

fn arb_year_bucket() -> impl Strategy<Value = Option<YearBucket>> {
    prop_oneof![
        Just(None),
        Just(Some(YearBucket::Lt1999)),
        Just(Some(YearBucket::Y1999_2010)),
        Just(Some(YearBucket::Y2011Plus)),
    ]
}

fn arb_interconnect() -> impl Strategy<Value = InterconnectPresence> {
    prop_oneof![
        Just(InterconnectPresence::Yes),
        Just(InterconnectPresence::No),
        Just(InterconnectPresence::Unknown),
    ]
}

prop_compose! {
    fn arb_profile()(
        state in arb_state(),
        property_type in arb_property_type(),
        bedrooms in 0u32..6,
        floors in 1u32..4,
        has_fuel_appliance in any::<bool>(),
        has_attached_garage in any::<bool>(),
        year_bucket in arb_year_bucket(),
        interconnect_present in arb_interconnect(),
        permit_planned in any::<bool>(),
    ) -> PropertyProfile {
        PropertyProfile {
            state,
            property_type,
            bedrooms,
            floors,
            has_fuel_appliance,
            has_attached_garage,
            year_bucket,
            interconnect_present,
            permit_planned,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn no_fuel_and_no_garage_means_no_co_recommendation(profile in arb_profile()) {
        let mut profile = profile;
        profile.has_fuel_appliance = false;
        profile.has_attached_garage = false;

        let plan = ChecklistEngine::embedded().resolve(&profile).unwrap();
        prop_assert!(plan.recommendations.iter().all(|rec| rec.alarm != AlarmType::Co));
    }

    #[test]
    fn fuel_appliance_means_co_near_or_outside_sleeping(profile in arb_profile()) {
        let mut profile = profile;
        profile.has_fuel_appliance = true;

        let plan = ChecklistEngine::embedded().resolve(&profile).unwrap();
        prop_assert!(plan.recommendations.iter().any(|rec| rec.alarm == AlarmType::Co
            && matches!(rec.place, Place::NearSleepingAreas | Place::OutsideSleepingAreas)));
    }

    #[test]
    fn chain_starts_with_baseline_and_keys_are_unique(profile in arb_profile()) {
        let plan = ChecklistEngine::embedded().resolve(&profile).unwrap();

        prop_assert!(!plan.jurisdiction_chain.is_empty());
        prop_assert_eq!(plan.jurisdiction_chain[0].as_str(), "US/common");

        let mut keys: Vec<(AlarmType, Place)> = plan
            .recommendations
            .iter()
            .map(|rec| (rec.alarm, rec.place))
            .collect();
        let total = keys.len();
        keys.sort_by_key(|(alarm, place)| (format!("{alarm:?}"), format!("{place:?}")));
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
    }

    #[test]
    fn resolution_is_deterministic(profile in arb_profile()) {
        let engine = ChecklistEngine::embedded();
        let first = serde_json::to_string(&engine.resolve(&profile).unwrap()).unwrap();
        let second = serde_json::to_string(&engine.resolve(&profile).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn notes_never_repeat(profile in arb_profile()) {
        let plan = ChecklistEngine::embedded().resolve(&profile).unwrap();
        let mut notes = plan.notes.clone();
        let total = notes.len();
        notes.sort();
        notes.dedup();
        prop_assert_eq!(notes.len(), total);
    }
}
