//! User biometrics: form models and the validator that turns raw form
//! fields into a [`ProfileInput`].

pub mod model;
pub mod validator;

pub use model::{ActivityLevel, Gender, ProfileGoal, ProfileInput, RawProfileFields};
pub use validator::{
    Bounds, Choice, ValidationMode, parse_choice, validate, validate_all, validate_with,
};
