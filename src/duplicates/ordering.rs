//! Ordering of duplicate sets and their members.
//!
//! Two independent choices make up an [`OrderingPolicy`]:
//!
//! - [`SortDirection`] orders sets by their per-file size.
//! - [`MemberOrder`] orders the members inside each set, which also decides
//!   which member a prune keeps (the first one).
//!
//! All sorts are stable, so equal keys keep their first-seen order and two
//! runs over an unmodified tree produce identical output.

use serde::{Deserialize, Serialize};

use super::groups::DuplicateSet;

/// Direction for ordering sets by size.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum SortDirection {
    /// Smallest first
    #[serde(rename = "asc", alias = "ascending")]
    #[value(name = "asc", alias = "ascending")]
    Ascending,
    /// Largest first
    #[default]
    #[serde(rename = "desc", alias = "descending")]
    #[value(name = "desc", alias = "descending")]
    Descending,
}

impl SortDirection {
    /// Sort sizes in place. Stable.
    pub fn sort(self, sizes: &mut [u64]) {
        self.sort_by_key(sizes, |size| *size);
    }

    /// Sort items in place by a size key. Stable: items with equal keys keep
    /// their relative order in both directions.
    pub fn sort_by_key<T, F>(self, items: &mut [T], key: F)
    where
        F: Fn(&T) -> u64,
    {
        match self {
            Self::Ascending => items.sort_by_key(&key),
            Self::Descending => items.sort_by_key(|item| std::cmp::Reverse(key(item))),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Order of members within a duplicate set.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MemberOrder {
    /// Lexicographic by path
    #[default]
    Path,
    /// Traversal order
    Discovery,
}

impl std::fmt::Display for MemberOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Discovery => write!(f, "discovery"),
        }
    }
}

/// How the pipeline orders its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderingPolicy {
    /// Set order by size
    pub direction: SortDirection,
    /// Member order within each set
    pub members: MemberOrder,
}

impl OrderingPolicy {
    /// Create a policy from its two parts.
    #[must_use]
    pub fn new(direction: SortDirection, members: MemberOrder) -> Self {
        Self { direction, members }
    }

    /// Order members within every set, then order the sets by size.
    #[must_use]
    pub fn apply(&self, sets: Vec<DuplicateSet>) -> Vec<DuplicateSet> {
        let mut sets: Vec<DuplicateSet> = match self.members {
            MemberOrder::Discovery => sets,
            MemberOrder::Path => sets
                .into_iter()
                .map(|set| {
                    let digest = *set.digest();
                    let size = set.size();
                    let mut files = set.into_files();
                    files.sort_by(|a, b| a.path.cmp(&b.path));
                    DuplicateSet::new(digest, size, files)
                })
                .collect(),
        };

        self.direction.sort_by_key(&mut sets, DuplicateSet::size);
        log::debug!(
            "Ordered {} set(s) by size ({}), members by {}",
            sets.len(),
            self.direction,
            self.members
        );
        sets
    }
}
