//! Canonical shapes used by the wizard.
//!
//! Two variants of the selection store exist, one for assessments and one
//! for training plans. Each gets its own live store.

pub mod assessment;
pub mod training;

pub use assessment::{Assessment, AssessmentView};
pub use training::{Training, TrainingView};
