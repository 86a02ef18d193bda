use crate::store::{Record, Shape};
use serde::Deserialize;

/// Field names of the training store.
pub mod fields {
    pub const SKILL: &str = "skill";
    pub const PERMUTATION: &str = "permutation";
    pub const START_TPN: &str = "startTPN";
    pub const SELECTED_LANDMARK: &str = "selectedLandmark";
    pub const SELECTED_TIMES_PER_WEEK: &str = "selectedTimesPerWeek";
    pub const SELECTED_AMOUNT: &str = "selectedAmount";
}

/// Selections for a training plan: skill, permutation, starting TPN and the
/// landmark, weekly frequency and amount picked by the user.
pub struct Training;

impl Shape for Training {
    const NAME: &'static str = "training";
    type View = TrainingView;

    fn initial_shape() -> Record {
        Record::new()
            .with(fields::SKILL, 0)
            .with(fields::PERMUTATION, 0)
            .with(fields::START_TPN, 0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingView {
    pub skill: f64,
    pub permutation: f64,
    #[serde(rename = "startTPN")]
    pub start_tpn: f64,
    pub selected_landmark: Option<f64>,
    pub selected_times_per_week: Option<f64>,
    pub selected_amount: Option<f64>,
}
