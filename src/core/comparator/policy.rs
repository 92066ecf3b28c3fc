//! Choosing which member of a duplicate group to keep.

use crate::core::store::FileRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which copy of a duplicate group is the master
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Indexed first (lowest insertion id)
    #[default]
    First,
    /// Largest file; ties go to the one indexed first
    Largest,
    /// Latest capture time; ties go to the one indexed first.
    ///
    /// A photo with a capture time always beats one without. Videos have
    /// no capture time, so the first indexed video wins.
    Newest,
}

impl KeepPolicy {
    /// Pick the master among `members`; `None` only for an empty slice
    pub fn select<'r>(&self, members: &'r [FileRecord]) -> Option<&'r FileRecord> {
        match self {
            KeepPolicy::First => members.iter().min_by_key(|r| r.id),
            KeepPolicy::Largest => members
                .iter()
                .max_by(|a, b| a.size.cmp(&b.size).then_with(|| b.id.cmp(&a.id))),
            KeepPolicy::Newest => members.iter().max_by(|a, b| newest_order(a, b)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeepPolicy::First => "first",
            KeepPolicy::Largest => "largest",
            KeepPolicy::Newest => "newest",
        }
    }
}

fn newest_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    let taken = |r: &FileRecord| r.details.photo().and_then(|m| m.date_taken);
    // None sorts before Some, so dated photos win
    taken(a).cmp(&taken(b)).then_with(|| b.id.cmp(&a.id))
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(KeepPolicy::First),
            "largest" => Ok(KeepPolicy::Largest),
            "newest" => Ok(KeepPolicy::Newest),
            other => Err(format!(
                "unknown keep policy '{other}' (expected first, largest or newest)"
            )),
        }
    }
}
