use crate::store::{Record, Shape};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Field names of the assessment store.
pub mod fields {
    pub const AGE: &str = "age";
    pub const CONDITION_SINCE: &str = "conditionSince";
    pub const SKILL: &str = "skill";
    pub const PERMUTATION: &str = "permutation";
    pub const ACCURACIES: &str = "accuracies";
    pub const SELECTED_LANDMARK: &str = "selectedLandmark";
    pub const SELECTED_FREQUENCY: &str = "selectedFrequency";
    pub const SELECTED_LENGTH: &str = "selectedLength";
}

/// Selections made while assessing a user: age, skill, the landmark,
/// frequency and length picked on each screen, and per-item accuracies.
pub struct Assessment;

impl Shape for Assessment {
    const NAME: &'static str = "assessment";
    type View = AssessmentView;

    fn initial_shape() -> Record {
        Record::new()
            .with(fields::AGE, 0)
            .with(fields::SKILL, 0)
            .with(fields::PERMUTATION, 0)
            .with(fields::ACCURACIES, Map::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub age: f64,
    pub condition_since: Option<f64>,
    pub skill: f64,
    pub permutation: f64,
    pub accuracies: Map<String, Value>,
    pub selected_landmark: Option<f64>,
    pub selected_frequency: Option<f64>,
    pub selected_length: Option<f64>,
}
