//! One user's pass through the onboarding flow.

use chrono::{DateTime, Utc};

use crate::error::OnboardingError;
use crate::profile::ValidationMode;

use super::model::OnboardingEvent;
use super::state::{OnboardingState, OnboardingStep};

/// Holds the state for a single user. Created at `welcome` on entry and
/// dropped when the flow is abandoned or completed.
#[derive(Debug, Clone)]
pub struct OnboardingSession {
    user_id: String,
    state: OnboardingState,
    mode: ValidationMode,
    started_at: DateTime<Utc>,
    /// Set while the finished plan is being written.
    completing: bool,
}

impl OnboardingSession {
    pub fn new(user_id: impl Into<String>, mode: ValidationMode) -> Self {
        Self {
            user_id: user_id.into(),
            state: OnboardingState::default(),
            mode,
            started_at: Utc::now(),
            completing: false,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn step(&self) -> OnboardingStep {
        self.state.step()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_completing(&self) -> bool {
        self.completing
    }

    /// Mark the session as persisting its final state. Cleared on failure.
    pub fn set_completing(&mut self, completing: bool) {
        self.completing = completing;
    }

    /// Compute the state `event` would lead to, without committing it.
    pub fn next_state(&self, event: &OnboardingEvent) -> Result<OnboardingState, OnboardingError> {
        self.state.apply(event, self.mode)
    }

    /// Commit a state produced by [`Self::next_state`].
    pub fn replace(&mut self, state: OnboardingState) {
        self.state = state;
    }

    /// Apply an event and commit the result.
    pub fn advance(&mut self, event: &OnboardingEvent) -> Result<OnboardingStep, OnboardingError> {
        let next = self.next_state(event)?;
        self.replace(next);
        Ok(self.step())
    }
}
