//! Goal adjustment: deficit or surplus applied to maintenance calories.

use serde::{Deserialize, Serialize};

use super::formula::Kcal;
use crate::profile::Choice;

/// Calorie goal chosen at the goal step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieGoal {
    Cut,
    #[default]
    Maintain,
    Bulk,
}

const CUT_FACTOR: f64 = 0.80;
const BULK_FACTOR: f64 = 1.15;

impl CalorieGoal {
    pub const ALL: [CalorieGoal; 3] = [Self::Cut, Self::Maintain, Self::Bulk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Maintain => "maintain",
            Self::Bulk => "bulk",
        }
    }
}

impl std::fmt::Display for CalorieGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Choice for CalorieGoal {
    const FIELD: &'static str = "goal";
    const ALLOWED: &'static [&'static str] = &["cut", "maintain", "bulk"];

    fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

/// Daily target for a goal.
///
/// Cut is a 20% deficit, bulk a 15% surplus, maintain is the identity.
pub fn apply_goal(maintenance: Kcal, goal: CalorieGoal) -> Kcal {
    match goal {
        CalorieGoal::Cut => (f64::from(maintenance) * CUT_FACTOR).round() as Kcal,
        CalorieGoal::Maintain => maintenance,
        CalorieGoal::Bulk => (f64::from(maintenance) * BULK_FACTOR).round() as Kcal,
    }
}

/// A committed calorie plan. The target is always derived, never edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaloriePlan {
    pub maintenance: Kcal,
    pub goal: CalorieGoal,
    pub target: Kcal,
}

impl CaloriePlan {
    pub fn new(maintenance: Kcal, goal: CalorieGoal) -> Self {
        Self {
            maintenance,
            goal,
            target: apply_goal(maintenance, goal),
        }
    }
}

/// Targets for every goal, shown while the user is choosing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPreview {
    pub cut: Kcal,
    pub maintain: Kcal,
    pub bulk: Kcal,
}

impl GoalPreview {
    pub fn new(maintenance: Kcal) -> Self {
        Self {
            cut: apply_goal(maintenance, CalorieGoal::Cut),
            maintain: apply_goal(maintenance, CalorieGoal::Maintain),
            bulk: apply_goal(maintenance, CalorieGoal::Bulk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::parse_choice;

    #[test]
    fn maintain_is_identity() {
        for m in [0, 1, 1200, 1500, 2000, 2594, 2763, 5000, Kcal::MAX] {
            assert_eq!(apply_goal(m, CalorieGoal::Maintain), m);
        }
    }

    #[test]
    fn cut_and_bulk_reference_values() {
        for m in [1500u32, 2000, 2763] {
            assert_eq!(
                apply_goal(m, CalorieGoal::Cut),
                (f64::from(m) * 0.8).round() as Kcal
            );
            assert_eq!(
                apply_goal(m, CalorieGoal::Bulk),
                (f64::from(m) * 1.15).round() as Kcal
            );
        }
        assert_eq!(apply_goal(1500, CalorieGoal::Cut), 1200);
        assert_eq!(apply_goal(1500, CalorieGoal::Bulk), 1725);
        assert_eq!(apply_goal(2000, CalorieGoal::Cut), 1600);
        assert_eq!(apply_goal(2000, CalorieGoal::Bulk), 2300);
        assert_eq!(apply_goal(2763, CalorieGoal::Cut), 2210);
        assert_eq!(apply_goal(2763, CalorieGoal::Bulk), 3177);
    }

    #[test]
    fn cut_of_reference_maintenance() {
        assert_eq!(apply_goal(2594, CalorieGoal::Cut), 2075);
    }

    #[test]
    fn plan_derives_target() {
        let plan = CaloriePlan::new(2594, CalorieGoal::Bulk);
        assert_eq!(plan.maintenance, 2594);
        assert_eq!(plan.target, 2983);
    }

    #[test]
    fn preview_covers_all_goals() {
        let preview = GoalPreview::new(2594);
        assert_eq!(
            preview,
            GoalPreview {
                cut: 2075,
                maintain: 2594,
                bulk: 2983,
            }
        );
    }

    #[test]
    fn goal_literals() {
        assert_eq!(parse_choice::<CalorieGoal>("cut"), Ok(CalorieGoal::Cut));
        assert_eq!(parse_choice::<CalorieGoal>(" bulk "), Ok(CalorieGoal::Bulk));
        let err = parse_choice::<CalorieGoal>("maintenance").unwrap_err();
        assert_eq!(err.field(), "goal");

        let json = serde_json::to_string(&CalorieGoal::Maintain).unwrap();
        assert_eq!(json, "\"maintain\"");
    }
}
