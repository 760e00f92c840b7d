//! Entity-resolution export shapes
//!
//! One [`ResolutionGroup`] per resolved entity: the records it merged and the
//! other entities it was found to be related to. Match levels are bounded
//! scores in `0..=MAX_MATCH_LEVEL`.

use serde::{Deserialize, Serialize};

/// Upper bound of the ER match-level score
pub const MAX_MATCH_LEVEL: f64 = 11.0;

/// A record merged into a resolved entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMember {
    pub record_id: String,
    pub match_key: String,
    pub match_level: u8,

    /// Entity description as seen through this record
    #[serde(default)]
    pub description: Option<String>,
}

/// Another resolved entity this one is related to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub entity_id: String,
    pub match_key: String,
    pub match_level: u8,
}

/// One resolved entity from the ER export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionGroup {
    pub resolved_entity_id: String,

    #[serde(default)]
    pub members: Vec<ResolvedMember>,

    #[serde(default)]
    pub related: Vec<RelatedEntity>,
}

/// Normalize a match level into a confidence in `[0, 1]`
///
/// Returns `None` when the level is outside the bounded score range.
pub fn match_confidence(level: u8) -> Option<f64> {
    let level = f64::from(level);
    if level > MAX_MATCH_LEVEL {
        None
    } else {
        Some(level / MAX_MATCH_LEVEL)
    }
}
