//! Visibility rules for resources and libraries.

pub mod model;
pub mod evaluator;

pub use model::{Visibility, Decision, ResourceView};
pub use evaluator::{can_view, can_view_library};
