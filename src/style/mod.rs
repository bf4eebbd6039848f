//! Computed-style extraction.

pub mod extract;
pub mod properties;

pub use extract::{build_extract_expression, normalize, StyleSnapshot};
pub use properties::{ALL_PROPERTIES, GLOBAL_SKIP, TRANSITION_PROPERTIES};
