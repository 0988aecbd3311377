pub mod types;

pub use types::{
    AlarmType, ChecklistPlan, ChecklistText, InterconnectPresence, Place, PropertyProfile,
    PropertyType, ResolvedRecommendation, TestingAction, TestingActionKind, TestingFrequency,
    YearBucket,
};
