//! The two-sided split of generated data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which half of the output a generator kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Data the host treats as authoritative (tags, rules, tables).
    Authoritative,
    /// Data only needed to present content (names, models).
    Presentation,
}

impl Side {
    /// Root directory artifacts of this side are written under.
    pub fn root_dir(&self) -> &'static str {
        match self {
            Side::Authoritative => "data",
            Side::Presentation => "assets",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Authoritative => write!(f, "authoritative"),
            Side::Presentation => write!(f, "presentation"),
        }
    }
}

/// The set of sides active for one generate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides {
    #[serde(default = "enabled")]
    pub authoritative: bool,
    #[serde(default = "enabled")]
    pub presentation: bool,
}

fn enabled() -> bool {
    true
}

impl Sides {
    /// Both sides active.
    pub fn all() -> Self {
        Self {
            authoritative: true,
            presentation: true,
        }
    }

    /// Only the given side active.
    pub fn only(side: Side) -> Self {
        Self {
            authoritative: side == Side::Authoritative,
            presentation: side == Side::Presentation,
        }
    }

    pub fn contains(&self, side: Side) -> bool {
        match side {
            Side::Authoritative => self.authoritative,
            Side::Presentation => self.presentation,
        }
    }
}

impl Default for Sides {
    fn default() -> Self {
        Self::all()
    }
}
