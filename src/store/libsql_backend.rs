//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Session;
use crate::calories::{CalorieGoal, CaloriePlan, Kcal};
use crate::error::DatabaseError;
use crate::photos::PhotoRef;
use crate::profile::{ActivityLevel, Choice, Gender, ProfileGoal, ProfileInput, parse_choice};
use crate::store::migrations;
use crate::store::traits::{Database, PlanType, StoredProfile};
use crate::tracker::model::{MealEntry, MealType};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Parse a stored enum literal, reporting the column on failure.
fn parse_column<T: Choice>(column: &str, value: &str) -> Result<T, DatabaseError> {
    parse_choice::<T>(value)
        .map_err(|_| DatabaseError::Serialization(format!("Invalid {column} in row: {value:?}")))
}

fn parse_plan_type(s: &str) -> Result<PlanType, DatabaseError> {
    match s {
        "free" => Ok(PlanType::Free),
        "paid" => Ok(PlanType::Paid),
        other => Err(DatabaseError::Serialization(format!(
            "Invalid plan_type in row: {other:?}"
        ))),
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn query_err(op: &str) -> impl Fn(libsql::Error) -> DatabaseError + '_ {
    move |e| DatabaseError::Query(format!("{op}: {e}"))
}

/// Map a libsql Row to a StoredProfile.
///
/// Column order matches PROFILE_COLUMNS.
fn row_to_profile(row: &libsql::Row) -> Result<StoredProfile, DatabaseError> {
    let read = query_err("row_to_profile");

    let user_id: String = row.get(0).map_err(&read)?;
    let height: f64 = row.get(1).map_err(&read)?;
    let weight: f64 = row.get(2).map_err(&read)?;
    let age: i64 = row.get(3).map_err(&read)?;
    let gender: String = row.get(4).map_err(&read)?;
    let activity_level: String = row.get(5).map_err(&read)?;
    let goal: String = row.get(6).map_err(&read)?;
    let maintenance: Option<i64> = row.get::<i64>(7).ok();
    let calorie_goal: Option<String> = row.get::<String>(8).ok();
    let target: Option<i64> = row.get::<i64>(9).ok();
    let photo: Option<String> = row.get::<String>(10).ok();
    let updated_at: String = row.get(11).map_err(&read)?;

    let profile = ProfileInput {
        height,
        weight,
        age: age as u32,
        gender: parse_column::<Gender>("gender", &gender)?,
        activity_level: parse_column::<ActivityLevel>("activity_level", &activity_level)?,
        goal: parse_column::<ProfileGoal>("goal", &goal)?,
    };

    let plan = match (maintenance, calorie_goal, target) {
        (Some(maintenance), Some(goal), Some(target)) => Some(CaloriePlan {
            maintenance: maintenance as Kcal,
            goal: parse_column::<CalorieGoal>("calorie_goal", &goal)?,
            target: target as Kcal,
        }),
        _ => None,
    };

    Ok(StoredProfile {
        user_id,
        profile,
        plan,
        photo: photo.map(PhotoRef::new),
        updated_at: parse_datetime(&updated_at),
    })
}

/// Map a libsql Row to a MealEntry.
///
/// Column order matches MEAL_COLUMNS.
fn row_to_meal(row: &libsql::Row) -> Result<MealEntry, DatabaseError> {
    let read = query_err("row_to_meal");

    let id: String = row.get(0).map_err(&read)?;
    let user_id: String = row.get(1).map_err(&read)?;
    let meal_type: String = row.get(2).map_err(&read)?;
    let description: Option<String> = row.get::<String>(3).ok();
    let calories: i64 = row.get(4).map_err(&read)?;
    let logged_on: String = row.get(5).map_err(&read)?;
    let created_at: String = row.get(6).map_err(&read)?;

    Ok(MealEntry {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::Serialization(format!("Invalid meal id {id:?}: {e}")))?,
        user_id,
        meal_type: parse_column::<MealType>("meal_type", &meal_type)?,
        description,
        calories: calories as Kcal,
        logged_on: logged_on.parse::<NaiveDate>().map_err(|e| {
            DatabaseError::Serialization(format!("Invalid logged_on {logged_on:?}: {e}"))
        })?,
        created_at: parse_datetime(&created_at),
    })
}

// ── Trait implementation ────────────────────────────────────────────

const PROFILE_COLUMNS: &str = "user_id, height, weight, age, gender, activity_level, goal, maintenance_kcal, calorie_goal, target_kcal, photo_ref, updated_at";

const MEAL_COLUMNS: &str = "id, user_id, meal_type, description, calories, logged_on, created_at";

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Sessions ────────────────────────────────────────────────────

    async fn create_session(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (token) DO UPDATE SET user_id = ?2, expires_at = ?3",
                params![token, user_id, expires_at.to_rfc3339()],
            )
            .await
            .map_err(query_err("create_session"))?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                params![token],
            )
            .await
            .map_err(query_err("get_session"))?;

        match rows.next().await.map_err(query_err("get_session"))? {
            Some(row) => {
                let user_id: String = row.get(0).map_err(query_err("get_session"))?;
                let expires_at: String = row.get(1).map_err(query_err("get_session"))?;
                Ok(Some(Session {
                    user_id,
                    expires_at: parse_datetime(&expires_at),
                }))
            }
            None => Ok(None),
        }
    }

    // ── Plans ───────────────────────────────────────────────────────

    async fn fetch_plan_type(&self, user_id: &str) -> Result<Option<PlanType>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT plan_type FROM user_plans WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(query_err("fetch_plan_type"))?;

        match rows.next().await.map_err(query_err("fetch_plan_type"))? {
            Some(row) => {
                let plan: String = row.get(0).map_err(query_err("fetch_plan_type"))?;
                parse_plan_type(&plan).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn set_plan_type(&self, user_id: &str, plan: PlanType) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO user_plans (user_id, plan_type, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id) DO UPDATE SET plan_type = ?2, updated_at = ?3",
                params![user_id, plan.as_str(), now],
            )
            .await
            .map_err(query_err("set_plan_type"))?;
        Ok(())
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn save_profile(
        &self,
        user_id: &str,
        profile: &ProfileInput,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO profiles
                    (user_id, height, weight, age, gender, activity_level, goal, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                 ON CONFLICT (user_id) DO UPDATE SET
                    height = ?2, weight = ?3, age = ?4, gender = ?5,
                    activity_level = ?6, goal = ?7, updated_at = ?8",
                params![
                    user_id,
                    profile.height,
                    profile.weight,
                    i64::from(profile.age),
                    profile.gender.as_str(),
                    profile.activity_level.as_str(),
                    profile.goal.as_str(),
                    now
                ],
            )
            .await
            .map_err(query_err("save_profile"))?;
        debug!(user_id, "Profile saved");
        Ok(())
    }

    async fn save_onboarding(
        &self,
        user_id: &str,
        profile: &ProfileInput,
        plan: &CaloriePlan,
        photo: Option<&PhotoRef>,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        // One statement, so the profile never lands without its plan.
        self.conn()
            .execute(
                "INSERT INTO profiles
                    (user_id, height, weight, age, gender, activity_level, goal,
                     maintenance_kcal, calorie_goal, target_kcal, photo_ref, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
                 ON CONFLICT (user_id) DO UPDATE SET
                    height = ?2, weight = ?3, age = ?4, gender = ?5,
                    activity_level = ?6, goal = ?7, maintenance_kcal = ?8,
                    calorie_goal = ?9, target_kcal = ?10, photo_ref = ?11, updated_at = ?12",
                params![
                    user_id,
                    profile.height,
                    profile.weight,
                    i64::from(profile.age),
                    profile.gender.as_str(),
                    profile.activity_level.as_str(),
                    profile.goal.as_str(),
                    i64::from(plan.maintenance),
                    plan.goal.as_str(),
                    i64::from(plan.target),
                    opt_text(photo.map(PhotoRef::as_str)),
                    now
                ],
            )
            .await
            .map_err(query_err("save_onboarding"))?;
        debug!(user_id, target = plan.target, "Onboarding saved");
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<StoredProfile>, DatabaseError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1");
        let mut rows = self
            .conn()
            .query(&sql, params![user_id])
            .await
            .map_err(query_err("get_profile"))?;

        match rows.next().await.map_err(query_err("get_profile"))? {
            Some(row) => row_to_profile(&row).map(Some),
            None => Ok(None),
        }
    }

    // ── Meals ───────────────────────────────────────────────────────

    async fn insert_meal(&self, meal: &MealEntry) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO meals (id, user_id, meal_type, description, calories, logged_on, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    meal.id.to_string(),
                    meal.user_id.as_str(),
                    meal.meal_type.as_str(),
                    opt_text(meal.description.as_deref()),
                    i64::from(meal.calories),
                    meal.logged_on.to_string(),
                    meal.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
                ],
            )
            .await
            .map_err(query_err("insert_meal"))?;
        Ok(())
    }

    async fn list_meals(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealEntry>, DatabaseError> {
        let sql = format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = ?1 AND logged_on = ?2
             ORDER BY created_at ASC, rowid ASC"
        );
        let mut rows = self
            .conn()
            .query(&sql, params![user_id, date.to_string()])
            .await
            .map_err(query_err("list_meals"))?;

        let mut meals = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err("list_meals"))? {
            match row_to_meal(&row) {
                Ok(meal) => meals.push(meal),
                Err(e) => tracing::warn!("Skipping meal row: {e}"),
            }
        }
        Ok(meals)
    }

    async fn delete_meal(&self, user_id: &str, id: Uuid) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id],
            )
            .await
            .map_err(query_err("delete_meal"))?;
        Ok(count > 0)
    }
}
