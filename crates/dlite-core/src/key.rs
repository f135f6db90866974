//! # Priority Key
//!
//! The two-component key used to order the open list.
//!
//! `k1 = min(g, rhs) + h(start, v) + k_m` estimates the total cost of a path
//! through the vertex, `k2 = min(g, rhs)` breaks ties. Ordering is strictly
//! lexicographic: `k2` is only consulted when the `k1` values are equal.

use std::cmp::Ordering;

/// Priority of a vertex in the open list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    /// Estimated total cost through the vertex.
    pub k1: f64,
    /// Tie-break: the raw `min(g, rhs)`.
    pub k2: f64,
}

impl Key {
    /// The key of a vertex with no finite estimate. Never less than any key.
    pub const INFINITE: Self = Self::new(f64::INFINITY, f64::INFINITY);

    /// Create a new key.
    #[must_use]
    pub const fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }

    /// Returns true iff `self` must be popped before `other`.
    #[must_use]
    pub fn less(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Total lexicographic comparison.
    ///
    /// Uses `f64::total_cmp`, so +infinity sorts after every finite value and
    /// two infinite components compare equal.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.k1
            .total_cmp(&other.k1)
            .then_with(|| self.k2.total_cmp(&other.k2))
    }
}

// =============================================================================
// TESTS
// =============================================================================
