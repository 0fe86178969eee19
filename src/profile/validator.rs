//! Biometric validation: raw form fields to a [`ProfileInput`].
//!
//! Fields are checked in a fixed order (height, weight, age, gender,
//! activity level, goal). In [`ValidationMode::FailFast`] the first
//! violation is returned; [`ValidationMode::Aggregate`] keeps going and
//! reports every violated field in the same order.

use serde::{Deserialize, Serialize};

use super::model::{ActivityLevel, Gender, ProfileGoal, ProfileInput, RawProfileFields};
use crate::error::ValidationError;

/// Inclusive numeric range for a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const HEIGHT_CM: Bounds = Bounds::new(100.0, 250.0);
pub const WEIGHT_KG: Bounds = Bounds::new(30.0, 300.0);
pub const AGE_YEARS: Bounds = Bounds::new(13.0, 100.0);

/// How many violations to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    FailFast,
    Aggregate,
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fail_fast" | "fail-fast" => Ok(Self::FailFast),
            "aggregate" => Ok(Self::Aggregate),
            other => Err(format!("expected fail_fast or aggregate, got {other:?}")),
        }
    }
}

/// An enumerated form field with a closed set of literals.
pub trait Choice: Sized {
    /// Field name used in error reports.
    const FIELD: &'static str;
    /// Canonical literals, in display order.
    const ALLOWED: &'static [&'static str];

    fn from_literal(s: &str) -> Option<Self>;
}

impl Choice for Gender {
    const FIELD: &'static str = "gender";
    const ALLOWED: &'static [&'static str] = &["male", "female"];

    fn from_literal(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl Choice for ActivityLevel {
    const FIELD: &'static str = "activity_level";
    const ALLOWED: &'static [&'static str] =
        &["sedentary", "light", "moderate", "active", "very-active"];

    fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == s)
    }
}

impl Choice for ProfileGoal {
    const FIELD: &'static str = "goal";
    const ALLOWED: &'static [&'static str] = &["muscle-gain", "cut", "bulk", "maintenance"];

    fn from_literal(s: &str) -> Option<Self> {
        match s {
            "muscle-gain" => Some(Self::MuscleGain),
            "cut" | "fat-loss" => Some(Self::Cut),
            "bulk" => Some(Self::Bulk),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }
}

/// Parse a required enumerated literal.
pub fn parse_choice<T: Choice>(raw: &str) -> Result<T, ValidationError> {
    T::from_literal(raw.trim()).ok_or_else(|| ValidationError::InvalidEnum {
        field: T::FIELD.to_string(),
        allowed: T::ALLOWED.iter().map(|s| s.to_string()).collect(),
    })
}

/// Parse an optional enumerated literal; absent means the default.
fn parse_optional_choice<T: Choice + Default>(raw: Option<&str>) -> Result<T, ValidationError> {
    match raw {
        Some(s) => parse_choice(s),
        None => Ok(T::default()),
    }
}

/// Parse a finite number.
pub fn parse_number(field: &str, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::Parse {
            field: field.to_string(),
        })
}

/// Check a parsed value against its bounds.
pub fn check_bounds(field: &str, value: f64, bounds: Bounds) -> Result<f64, ValidationError> {
    if bounds.contains(value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfBounds {
            field: field.to_string(),
            min: bounds.min,
            max: bounds.max,
            actual: value,
        })
    }
}

fn bounded(field: &str, raw: &str, bounds: Bounds) -> Result<f64, ValidationError> {
    check_bounds(field, parse_number(field, raw)?, bounds)
}

/// Age is whole years; any fractional part is dropped before the bound check.
fn parse_age(raw: &str) -> Result<u32, ValidationError> {
    let years = parse_number("age", raw)?.trunc();
    check_bounds("age", years, AGE_YEARS).map(|v| v as u32)
}

/// Validate in fail-fast mode, returning the first violation.
pub fn validate(raw: &RawProfileFields) -> Result<ProfileInput, ValidationError> {
    run(raw, ValidationMode::FailFast).map_err(|mut errors| errors.remove(0))
}

/// Validate in aggregate mode, returning every violation in field order.
pub fn validate_all(raw: &RawProfileFields) -> Result<ProfileInput, Vec<ValidationError>> {
    run(raw, ValidationMode::Aggregate)
}

/// Validate with the given mode. The error list is never empty.
pub fn validate_with(
    raw: &RawProfileFields,
    mode: ValidationMode,
) -> Result<ProfileInput, Vec<ValidationError>> {
    run(raw, mode)
}

struct Collector {
    mode: ValidationMode,
    errors: Vec<ValidationError>,
}

impl Collector {
    fn keep<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    fn halted(&self) -> bool {
        self.mode == ValidationMode::FailFast && !self.errors.is_empty()
    }
}

fn run(raw: &RawProfileFields, mode: ValidationMode) -> Result<ProfileInput, Vec<ValidationError>> {
    let mut c = Collector {
        mode,
        errors: Vec::new(),
    };

    let height = c.keep(bounded("height", &raw.height, HEIGHT_CM));
    if c.halted() {
        return Err(c.errors);
    }
    let weight = c.keep(bounded("weight", &raw.weight, WEIGHT_KG));
    if c.halted() {
        return Err(c.errors);
    }
    let age = c.keep(parse_age(&raw.age));
    if c.halted() {
        return Err(c.errors);
    }
    let gender = c.keep(parse_optional_choice::<Gender>(raw.gender.as_deref()));
    if c.halted() {
        return Err(c.errors);
    }
    let activity_level =
        c.keep(parse_optional_choice::<ActivityLevel>(raw.activity_level.as_deref()));
    if c.halted() {
        return Err(c.errors);
    }
    let goal = c.keep(parse_optional_choice::<ProfileGoal>(raw.goal.as_deref()));

    match (height, weight, age, gender, activity_level, goal) {
        (Some(height), Some(weight), Some(age), Some(gender), Some(activity_level), Some(goal)) => {
            Ok(ProfileInput {
                height,
                weight,
                age,
                gender,
                activity_level,
                goal,
            })
        }
        _ => Err(c.errors),
    }
}
