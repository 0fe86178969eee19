//! Onboarding flow: the step-by-step path from welcome to the tracker.
//!
//! Each user gets an [`OnboardingSession`] whose state only changes through
//! [`OnboardingState::apply`]. The [`OnboardingManager`] holds the sessions,
//! checks access, and persists the plan once the tracker is reached.

pub mod manager;
pub mod model;
pub mod routes;
pub mod session;
pub mod state;

pub use manager::OnboardingManager;
pub use model::{OnboardingEvent, OnboardingStatus, StepOutcome};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use session::OnboardingSession;
pub use state::{OnboardingState, OnboardingStep};
