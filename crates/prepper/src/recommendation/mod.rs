//! Recommendations derived from column statistics.
//!
//! The service emits free-text recommendations per column. They are
//! classified once into a [`RecommendationKind`]; one-click fixes are derived
//! from the kind. Dismissals are keyed by the exact text and reconciled after
//! every stats refresh so stale entries do not accumulate.

mod one_click;
mod tracker;

pub use one_click::{RecommendationKind, one_click_request};
pub use tracker::{DismissalSet, Recommendation, reconcile, visible_recommendations};
