//! Analysis stages: free-text properties → normalized comparison scores.
//!
//! Each submodule is one pure transformation. None of them can fail: text
//! that does not parse degrades to a defined sentinel value instead of an
//! error, so a sloppy extraction never aborts report generation.
//!
//! ## Data Flow
//!
//! ```text
//! Properties ──▶ extract ──▶ value        (numeric attributes)
//!            └─▶ qualitative             (corrosion rating)
//!                      │
//!                      ▼
//!                  normalize ──▶ scores   (0–100 per attribute)
//! ```
//!
//! 1. [`value`]      : first numeric token of a string
//! 2. [`extract`]    : first property whose label matches a keyword set
//! 3. [`qualitative`]: excellent/good/fair/poor → fixed score
//! 4. [`normalize`]  : rescale a column to 0–100, direct or inverse
//! 5. [`attribute`]  : the fixed attribute schema and how each is scored
//! 6. [`scores`]     : raw and normalized vectors for a set of materials

pub mod attribute;
pub mod extract;
pub mod normalize;
pub mod qualitative;
pub mod scores;
pub mod value;

pub use attribute::{Attribute, Scoring};
pub use extract::{extract_numeric, find_property};
pub use normalize::{normalize, Direction};
pub use qualitative::{map_qualitative, QualitativeTier};
pub use scores::{attribute_series, score_matches, AttributeVector, ScoredMaterial};
pub use value::parse_value;
