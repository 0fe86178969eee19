//! Session lookup and the premium-plan gate.
//!
//! Sessions are issued elsewhere; this module only resolves a bearer token
//! to a user and checks the user's plan tier.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AccessError, DatabaseError, Error};
use crate::store::{Database, PlanType};

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Resolves a bearer token to a live session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError>;
}

/// Sessions read from the `sessions` table.
pub struct DbSessions {
    db: Arc<dyn Database>,
}

impl DbSessions {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionProvider for DbSessions {
    async fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let session = self.db.get_session(token).await?;
        Ok(session.filter(|s| {
            let expired = s.is_expired_at(Utc::now());
            if expired {
                debug!(user_id = %s.user_id, "Session expired");
            }
            !expired
        }))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Combines session lookup with the plan-tier check.
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<dyn SessionProvider>,
    db: Arc<dyn Database>,
}

impl AccessGate {
    pub fn new(sessions: Arc<dyn SessionProvider>, db: Arc<dyn Database>) -> Self {
        Self { sessions, db }
    }

    /// Resolve the caller's session, failing with [`AccessError::NoSession`].
    pub async fn session(&self, token: Option<&str>) -> Result<Session, Error> {
        let Some(token) = token else {
            return Err(AccessError::NoSession.into());
        };
        self.sessions
            .get_session(token)
            .await?
            .ok_or_else(|| AccessError::NoSession.into())
    }

    /// Resolve the session and require a paid plan.
    ///
    /// A user with no plan row is treated as free.
    pub async fn premium(&self, token: Option<&str>) -> Result<Session, Error> {
        let session = self.session(token).await?;
        self.require_paid(&session).await?;
        Ok(session)
    }

    /// Check the plan tier of an already resolved session.
    pub async fn require_paid(&self, session: &Session) -> Result<(), Error> {
        let plan = self.db.fetch_plan_type(&session.user_id).await?;
        match plan {
            Some(PlanType::Paid) => Ok(()),
            other => {
                let plan = other.map(|p| p.as_str()).unwrap_or("none");
                debug!(user_id = %session.user_id, plan, "Premium access denied");
                Err(AccessError::PlanRequired {
                    plan: plan.to_string(),
                }
                .into())
            }
        }
    }
}
