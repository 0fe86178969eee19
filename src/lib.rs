//! FitIn Planner: premium onboarding and calorie-planning service.

pub mod api;
pub mod auth;
pub mod calories;
pub mod config;
pub mod error;
pub mod notify;
pub mod onboarding;
pub mod photos;
pub mod profile;
pub mod store;
pub mod tracker;
