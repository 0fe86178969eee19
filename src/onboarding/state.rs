//! Onboarding state machine: which step the user is on and the data that
//! step carries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calories::{CalorieGoal, CaloriePlan, GoalPreview, Kcal};
use crate::error::{OnboardingError, ValidationError};
use crate::photos::PhotoRef;
use crate::profile::{ProfileInput, ValidationMode, parse_choice, validate_with};

use super::model::OnboardingEvent;

/// The steps of the onboarding flow.
///
/// Progresses linearly: Welcome → Calculator → Goal → Photo → Community →
/// Tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    Welcome,
    Calculator,
    Goal,
    Photo,
    Community,
    Tracker,
}

impl OnboardingStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        self.next() == Some(target)
    }

    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Tracker)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Welcome => Some(Calculator),
            Calculator => Some(Goal),
            Goal => Some(Photo),
            Photo => Some(Community),
            Community => Some(Tracker),
            Tracker => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Calculator => "calculator",
            Self::Goal => "goal",
            Self::Photo => "photo",
            Self::Community => "community",
            Self::Tracker => "tracker",
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onboarding state. Each variant holds exactly the data that exists once
/// the user has reached that step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum OnboardingState {
    #[default]
    Welcome,
    Calculator,
    Goal {
        profile: ProfileInput,
        maintenance: Kcal,
    },
    Photo {
        profile: ProfileInput,
        plan: CaloriePlan,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<PhotoRef>,
    },
    Community {
        profile: ProfileInput,
        plan: CaloriePlan,
        photo: PhotoRef,
    },
    Tracker {
        profile: ProfileInput,
        plan: CaloriePlan,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo: Option<PhotoRef>,
    },
}

impl OnboardingState {
    pub fn step(&self) -> OnboardingStep {
        match self {
            Self::Welcome => OnboardingStep::Welcome,
            Self::Calculator => OnboardingStep::Calculator,
            Self::Goal { .. } => OnboardingStep::Goal,
            Self::Photo { .. } => OnboardingStep::Photo,
            Self::Community { .. } => OnboardingStep::Community,
            Self::Tracker { .. } => OnboardingStep::Tracker,
        }
    }

    pub fn profile(&self) -> Option<&ProfileInput> {
        match self {
            Self::Welcome | Self::Calculator => None,
            Self::Goal { profile, .. }
            | Self::Photo { profile, .. }
            | Self::Community { profile, .. }
            | Self::Tracker { profile, .. } => Some(profile),
        }
    }

    pub fn plan(&self) -> Option<&CaloriePlan> {
        match self {
            Self::Photo { plan, .. } | Self::Community { plan, .. } | Self::Tracker { plan, .. } => {
                Some(plan)
            }
            _ => None,
        }
    }

    pub fn photo(&self) -> Option<&PhotoRef> {
        match self {
            Self::Photo { photo, .. } | Self::Tracker { photo, .. } => photo.as_ref(),
            Self::Community { photo, .. } => Some(photo),
            _ => None,
        }
    }

    /// Maintenance calories, known from the goal step on.
    pub fn maintenance(&self) -> Option<Kcal> {
        match self {
            Self::Goal { maintenance, .. } => Some(*maintenance),
            _ => self.plan().map(|p| p.maintenance),
        }
    }

    /// The single calorie figure shown to the user: maintenance until a goal
    /// is picked, the goal-adjusted target afterwards.
    pub fn calorie_target(&self) -> Option<Kcal> {
        match self {
            Self::Goal { maintenance, .. } => Some(*maintenance),
            _ => self.plan().map(|p| p.target),
        }
    }

    /// Candidate targets while the user is choosing a goal.
    pub fn goal_preview(&self) -> Option<GoalPreview> {
        match self {
            Self::Goal { maintenance, .. } => Some(GoalPreview::new(*maintenance)),
            _ => None,
        }
    }

    /// Apply one event and return the replacement state.
    ///
    /// `self` is never modified; on error the caller keeps the old state.
    pub fn apply(
        &self,
        event: &OnboardingEvent,
        mode: ValidationMode,
    ) -> Result<OnboardingState, OnboardingError> {
        let step = self.step();
        if step.is_terminal() {
            return Err(OnboardingError::AlreadyComplete);
        }

        let next = match (self, event) {
            (Self::Welcome, OnboardingEvent::Acknowledge) => Self::Calculator,

            (Self::Calculator, OnboardingEvent::SubmitCalculator(raw)) => {
                let profile = validate_with(raw, mode).map_err(OnboardingError::Invalid)?;
                let maintenance = profile.maintenance_calories();
                Self::Goal {
                    profile,
                    maintenance,
                }
            }

            (
                Self::Goal {
                    profile,
                    maintenance,
                },
                OnboardingEvent::SelectGoal { goal },
            ) => {
                let goal = parse_choice::<CalorieGoal>(goal)?;
                let mut profile = profile.clone();
                profile.goal = goal.into();
                Self::Photo {
                    profile,
                    plan: CaloriePlan::new(*maintenance, goal),
                    photo: None,
                }
            }

            (Self::Photo { profile, plan, .. }, OnboardingEvent::AttachPhoto { photo }) => {
                if photo.is_empty() {
                    return Err(photo_required().into());
                }
                Self::Photo {
                    profile: profile.clone(),
                    plan: *plan,
                    photo: Some(photo.clone()),
                }
            }

            (
                Self::Photo {
                    profile,
                    plan,
                    photo,
                },
                OnboardingEvent::SubmitPhoto,
            ) => match photo.as_ref().filter(|p| !p.is_empty()) {
                Some(photo) => Self::Community {
                    profile: profile.clone(),
                    plan: *plan,
                    photo: photo.clone(),
                },
                None => return Err(photo_required().into()),
            },

            (
                Self::Community {
                    profile,
                    plan,
                    photo,
                },
                OnboardingEvent::JoinCommunity,
            ) => Self::Tracker {
                profile: profile.clone(),
                plan: *plan,
                photo: Some(photo.clone()),
            },

            (_, event) => {
                return Err(OnboardingError::UnexpectedEvent {
                    step: step.to_string(),
                    event: event.name().to_string(),
                });
            }
        };

        debug_assert!(step.can_transition_to(next.step()) || step == next.step());
        debug!(from = %step, to = %next.step(), event = event.name(), "Onboarding transition");
        Ok(next)
    }
}

fn photo_required() -> ValidationError {
    ValidationError::MissingRequired {
        step: OnboardingStep::Photo.to_string(),
        field: "photo".to_string(),
    }
}
