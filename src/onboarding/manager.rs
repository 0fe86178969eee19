//! OnboardingManager: coordinates per-user sessions, access checks,
//! persistence on completion, and user notices.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::{AccessGate, Session};
use crate::calories::CaloriePlan;
use crate::error::{Error, OnboardingError, PhotoError};
use crate::notify::{Notice, Notifier};
use crate::photos::{PhotoRef, PhotoStore};
use crate::profile::{ProfileInput, RawProfileFields, ValidationMode, validate_with};
use crate::store::Database;

use super::model::{OnboardingEvent, OnboardingStatus, StepOutcome};
use super::session::OnboardingSession;
use super::state::{OnboardingState, OnboardingStep};

pub const DETAILS_SAVED: &str = "Details saved successfully!";
pub const DETAILS_FAILED: &str = "Failed to save details. Please try again.";
pub const WELCOME_MESSAGE: &str = "Welcome to the FitIn community!";
pub const COMPLETION_FAILED: &str = "Failed to save your plan. Please try again.";

/// Coordinates the onboarding flow for every signed-in user.
pub struct OnboardingManager {
    db: Arc<dyn Database>,
    gate: AccessGate,
    photos: Arc<dyn PhotoStore>,
    notifier: Arc<dyn Notifier>,
    mode: ValidationMode,
    sessions: RwLock<HashMap<String, OnboardingSession>>,
}

impl OnboardingManager {
    pub fn new(
        db: Arc<dyn Database>,
        gate: AccessGate,
        photos: Arc<dyn PhotoStore>,
        notifier: Arc<dyn Notifier>,
        mode: ValidationMode,
    ) -> Self {
        Self {
            db,
            gate,
            photos,
            notifier,
            mode,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the caller and require a paid plan.
    ///
    /// A caller who loses premium access mid-flow has their session dropped.
    async fn authorize(&self, token: Option<&str>) -> Result<Session, Error> {
        let session = self.gate.session(token).await?;
        if let Err(e) = self.gate.require_paid(&session).await {
            let removed = self.sessions.write().await.remove(&session.user_id);
            if let Some(onboarding) = removed {
                warn!(user_id = %session.user_id, "Onboarding ended: premium plan required");
                self.discard(&onboarding).await;
            }
            return Err(e);
        }
        Ok(session)
    }

    /// Start the flow. Any in-progress session is discarded.
    pub async fn enter(&self, token: Option<&str>) -> Result<OnboardingStatus, Error> {
        let session = self.authorize(token).await?;
        let onboarding = OnboardingSession::new(&session.user_id, self.mode);
        let status = OnboardingStatus::from(onboarding.state());

        let previous = self
            .sessions
            .write()
            .await
            .insert(session.user_id.clone(), onboarding);
        info!(
            user_id = %session.user_id,
            restarted = previous.is_some(),
            "Onboarding started"
        );
        if let Some(previous) = previous {
            self.discard(&previous).await;
        }
        Ok(status)
    }

    /// Current status: the live session if there is one, otherwise the
    /// completed plan from storage.
    pub async fn status(&self, token: Option<&str>) -> Result<OnboardingStatus, Error> {
        let session = self.authorize(token).await?;

        if let Some(onboarding) = self.sessions.read().await.get(&session.user_id) {
            return Ok(OnboardingStatus::from(onboarding.state()));
        }

        let stored = self.db.get_profile(&session.user_id).await?;
        match stored {
            Some(stored) => match stored.plan {
                Some(plan) => Ok(OnboardingStatus::from(&OnboardingState::Tracker {
                    profile: stored.profile,
                    plan,
                    photo: stored.photo,
                })),
                None => Err(not_started(&session.user_id)),
            },
            None => Err(not_started(&session.user_id)),
        }
    }

    /// Apply one event to the caller's session.
    pub async fn dispatch(
        &self,
        token: Option<&str>,
        event: OnboardingEvent,
    ) -> Result<StepOutcome, Error> {
        let session = self.authorize(token).await?;
        self.apply(&session.user_id, event).await
    }

    /// Store an uploaded photo and attach it to the caller's session.
    pub async fn attach_photo(&self, token: Option<&str>, bytes: &[u8]) -> Result<StepOutcome, Error> {
        let session = self.authorize(token).await?;
        let user_id = session.user_id.as_str();

        let step = self.current_step(user_id).await?;
        if step != OnboardingStep::Photo {
            let err = OnboardingError::UnexpectedEvent {
                step: step.to_string(),
                event: "attach_photo".to_string(),
            };
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err.into());
        }

        let photo = match self.photos.store(user_id, bytes).await {
            Ok(photo) => photo,
            Err(e) => {
                warn!(user_id, error = %e, "Photo upload rejected");
                let message = match e {
                    PhotoError::Empty => "Please upload a photo to continue".to_string(),
                    ref other => other.to_string(),
                };
                self.notifier.notify(Notice::error(message));
                return Err(e.into());
            }
        };

        let outcome = self
            .apply(user_id, OnboardingEvent::AttachPhoto { photo: photo.clone() })
            .await;
        if outcome.is_err() {
            self.remove_photo(user_id, &photo).await;
        }
        outcome
    }

    /// Drop the caller's session and any photo it uploaded. Returns whether
    /// a session existed.
    pub async fn abandon(&self, token: Option<&str>) -> Result<bool, Error> {
        let session = self.gate.session(token).await?;
        let removed = self.sessions.write().await.remove(&session.user_id);
        let Some(onboarding) = removed else {
            return Ok(false);
        };
        info!(
            user_id = %session.user_id,
            step = %onboarding.step(),
            "Onboarding abandoned"
        );
        self.discard(&onboarding).await;
        Ok(true)
    }

    /// Validate and save the standalone details form.
    pub async fn save_details(
        &self,
        token: Option<&str>,
        raw: &RawProfileFields,
    ) -> Result<ProfileInput, Error> {
        let session = self.gate.session(token).await?;
        let user_id = session.user_id.as_str();

        let profile = match validate_with(raw, self.mode) {
            Ok(profile) => profile,
            Err(errors) => {
                let err = OnboardingError::Invalid(errors);
                self.report(user_id, "details", &err);
                return Err(err.into());
            }
        };

        if let Err(e) = self.db.save_profile(user_id, &profile).await {
            warn!(user_id, error = %e, "Failed to save details");
            self.notifier.notify(Notice::error(DETAILS_FAILED));
            return Err(e.into());
        }

        info!(user_id, "Details saved");
        self.notifier.notify(Notice::success(DETAILS_SAVED));
        Ok(profile)
    }

    async fn current_step(&self, user_id: &str) -> Result<OnboardingStep, Error> {
        self.sessions
            .read()
            .await
            .get(user_id)
            .map(OnboardingSession::step)
            .ok_or_else(|| not_started(user_id))
    }

    /// Run one transition. Non-terminal steps commit under the write lock;
    /// completion persists with the lock released.
    async fn apply(&self, user_id: &str, event: OnboardingEvent) -> Result<StepOutcome, Error> {
        let mut sessions = self.sessions.write().await;
        let Some(onboarding) = sessions.get_mut(user_id) else {
            let err = not_started(user_id);
            self.notifier.notify(Notice::error(err.to_string()));
            return Err(err);
        };

        let from = onboarding.step();
        let next = match onboarding.next_state(&event) {
            Ok(next) => next,
            Err(e) => {
                self.report(user_id, from.as_str(), &e);
                return Err(e.into());
            }
        };

        match next {
            OnboardingState::Tracker {
                profile,
                plan,
                photo,
            } => {
                onboarding.set_completing(true);
                let started_at = onboarding.started_at();
                drop(sessions);
                self.complete(user_id, started_at, profile, plan, photo)
                    .await
            }
            next => {
                let superseded = match (onboarding.state().photo(), next.photo()) {
                    (Some(old), Some(new)) if old != new => Some(old.clone()),
                    _ => None,
                };
                let notice = step_notice(&event, &next);
                onboarding.replace(next);
                info!(user_id, from = %from, to = %onboarding.step(), event = event.name(), "Onboarding step");
                let status = OnboardingStatus::from(onboarding.state());
                drop(sessions);

                if let Some(old) = superseded {
                    self.remove_photo(user_id, &old).await;
                }
                if let Some(notice) = &notice {
                    self.notifier.notify(notice.clone());
                }
                Ok(StepOutcome { status, notice })
            }
        }
    }

    /// Write the finished plan, then drop the session it came from.
    ///
    /// A failed write leaves the session at `community` so the user can retry.
    async fn complete(
        &self,
        user_id: &str,
        started_at: DateTime<Utc>,
        profile: ProfileInput,
        plan: CaloriePlan,
        photo: Option<PhotoRef>,
    ) -> Result<StepOutcome, Error> {
        let saved = self
            .db
            .save_onboarding(user_id, &profile, &plan, photo.as_ref())
            .await;

        let mut sessions = self.sessions.write().await;
        let same_session = sessions
            .get(user_id)
            .is_some_and(|s| s.started_at() == started_at);

        if let Err(e) = saved {
            if same_session {
                if let Some(onboarding) = sessions.get_mut(user_id) {
                    onboarding.set_completing(false);
                }
            }
            drop(sessions);
            if !same_session {
                if let Some(photo) = &photo {
                    self.remove_photo(user_id, photo).await;
                }
            }
            warn!(user_id, error = %e, "Failed to persist completed onboarding");
            self.notifier.notify(Notice::error(COMPLETION_FAILED));
            return Err(e.into());
        }

        if same_session {
            sessions.remove(user_id);
        }
        drop(sessions);

        info!(user_id, target = plan.target, goal = %plan.goal, "Onboarding complete");
        let notice = Notice::success(WELCOME_MESSAGE);
        self.notifier.notify(notice.clone());
        Ok(StepOutcome {
            status: OnboardingStatus::from(&OnboardingState::Tracker {
                profile,
                plan,
                photo,
            }),
            notice: Some(notice),
        })
    }

    /// Remove the photo of a session that will never complete. A session
    /// that is mid-completion keeps it: the stored plan points at it.
    async fn discard(&self, onboarding: &OnboardingSession) {
        if onboarding.is_completing() {
            return;
        }
        if let Some(photo) = onboarding.state().photo() {
            self.remove_photo(onboarding.user_id(), photo).await;
        }
    }

    async fn remove_photo(&self, user_id: &str, photo: &PhotoRef) {
        if let Err(e) = self.photos.remove(photo).await {
            warn!(user_id, photo = %photo, error = %e, "Failed to remove photo");
        }
    }

    /// Surface a rejected event: one notice per validation failure.
    fn report(&self, user_id: &str, step: &str, err: &OnboardingError) {
        warn!(user_id, step, error = %err, "Onboarding event rejected");
        let failures = err.validation_errors();
        if failures.is_empty() {
            self.notifier.notify(Notice::error(err.to_string()));
        } else {
            for failure in failures {
                self.notifier.notify(Notice::error(failure.to_string()));
            }
        }
    }
}

fn not_started(user_id: &str) -> Error {
    OnboardingError::NotStarted {
        user_id: user_id.to_string(),
    }
    .into()
}

/// Success acknowledgement for a committed non-terminal step.
fn step_notice(event: &OnboardingEvent, next: &OnboardingState) -> Option<Notice> {
    match (event, next) {
        (OnboardingEvent::SubmitCalculator(_), OnboardingState::Goal { maintenance, .. }) => Some(
            Notice::success(format!("Maintenance calories: {maintenance} kcal/day")),
        ),
        (OnboardingEvent::SelectGoal { .. }, OnboardingState::Photo { plan, .. }) => Some(
            Notice::success(format!("Daily target set to {} kcal ({})", plan.target, plan.goal)),
        ),
        (OnboardingEvent::AttachPhoto { .. }, _) => Some(Notice::success("Photo uploaded")),
        _ => None,
    }
}
