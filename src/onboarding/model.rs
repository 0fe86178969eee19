//! Onboarding events and the views returned to clients.

use serde::{Deserialize, Serialize};

use crate::calories::{GoalPreview, Kcal};
use crate::notify::Notice;
use crate::photos::PhotoRef;
use crate::profile::RawProfileFields;

use super::state::{OnboardingState, OnboardingStep};

/// Something the user did on the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnboardingEvent {
    /// Leave the welcome screen.
    Acknowledge,
    /// Submit the calculator form.
    SubmitCalculator(RawProfileFields),
    /// Pick cut, maintain or bulk.
    SelectGoal { goal: String },
    /// Record an uploaded photo without leaving the photo step.
    AttachPhoto { photo: PhotoRef },
    SubmitPhoto,
    JoinCommunity,
}

impl OnboardingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Acknowledge => "acknowledge",
            Self::SubmitCalculator(_) => "submit_calculator",
            Self::SelectGoal { .. } => "select_goal",
            Self::AttachPhoto { .. } => "attach_photo",
            Self::SubmitPhoto => "submit_photo",
            Self::JoinCommunity => "join_community",
        }
    }
}

/// Onboarding status returned by the REST endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingStatus {
    pub step: OnboardingStep,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calorie_target: Option<Kcal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_preview: Option<GoalPreview>,
    pub state: OnboardingState,
}

impl From<&OnboardingState> for OnboardingStatus {
    fn from(state: &OnboardingState) -> Self {
        let step = state.step();
        Self {
            step,
            completed: step.is_terminal(),
            calorie_target: state.calorie_target(),
            goal_preview: state.goal_preview(),
            state: state.clone(),
        }
    }
}

/// Result of a successfully applied event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub status: OnboardingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: OnboardingEvent = serde_json::from_str(r#"{"type":"acknowledge"}"#).unwrap();
        assert_eq!(event, OnboardingEvent::Acknowledge);

        let event: OnboardingEvent = serde_json::from_str(
            r#"{"type":"submit_calculator","height":"175","weight":"70","age":"25","gender":"male"}"#,
        )
        .unwrap();
        let OnboardingEvent::SubmitCalculator(raw) = event else {
            panic!("expected submit_calculator");
        };
        assert_eq!(raw.height, "175");
        assert_eq!(raw.gender.as_deref(), Some("male"));
        assert!(raw.activity_level.is_none());

        let event: OnboardingEvent =
            serde_json::from_str(r#"{"type":"select_goal","goal":"bulk"}"#).unwrap();
        assert_eq!(event.name(), "select_goal");
    }

    #[test]
    fn status_reflects_state() {
        let status = OnboardingStatus::from(&OnboardingState::Welcome);
        assert_eq!(status.step, OnboardingStep::Welcome);
        assert!(!status.completed);
        assert!(status.calorie_target.is_none());

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["step"], "welcome");
        assert_eq!(json["state"]["step"], "welcome");
        assert!(json.get("goal_preview").is_none());
    }
}
