//! Smart matching: link travel plans to open delivery orders by place name.
//!
//! Someone heading to "City Mall" can pick up an order waiting at "City Mall",
//! or at "mall". Places are free text typed by members, so matching is a
//! fuzzy string score rather than an id comparison.
//!
//! Scoring is deliberately simple:
//!
//! 1. Either side blank → `0.0`.
//! 2. Case-insensitive equality → `1.0`.
//! 3. One side contains the other → `0.8` ("Airport" / "Mumbai Airport").
//! 4. Otherwise, whitespace token overlap: the number of tokens on the left
//!    that appear anywhere on the right, over the larger token count.
//!
//! Tokens are split on whitespace only. Punctuation stays attached
//! (`"mall,"` and `"mall"` are different tokens) and nothing is stemmed.
//! Overlap is a membership test, not a multiset intersection: a word repeated
//! on the left counts once per repetition if it appears on the right at all.
//!
//! Everything here is a pure function over borrowed records.

use tracing::debug;

use crate::model::{Order, OrderStatus, Trip};

/// Scores above this are worth showing as a match.
pub const MATCH_THRESHOLD: f64 = 0.4;

/// Score for case-insensitive equality.
pub const EXACT_SCORE: f64 = 1.0;

/// Score when one place name contains the other.
pub const CONTAINMENT_SCORE: f64 = 0.8;

/// Anything with a destination: the left-hand side of a match.
pub trait TravelIntent {
    fn destination(&self) -> &str;
}

/// Anything with a location and lifecycle status: the right-hand side of a match.
pub trait OrderRecord {
    fn location(&self) -> &str;
    fn status(&self) -> OrderStatus;
}

impl TravelIntent for Trip {
    fn destination(&self) -> &str {
        &self.destination
    }
}

impl OrderRecord for Order {
    fn location(&self) -> &str {
        &self.location
    }

    fn status(&self) -> OrderStatus {
        self.status
    }
}

/// Similarity of two place names, in `[0.0, 1.0]`.
#[allow(clippy::cast_precision_loss)] // Token counts are tiny.
pub fn score(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return EXACT_SCORE;
    }

    if a.contains(&b) || b.contains(&a) {
        return CONTAINMENT_SCORE;
    }

    let a_tokens: Vec<&str> = a.split_whitespace().collect();
    let b_tokens: Vec<&str> = b.split_whitespace().collect();

    let longest = a_tokens.len().max(b_tokens.len());
    if longest == 0 {
        return 0.0;
    }

    let matched = a_tokens.iter().filter(|&t| b_tokens.contains(t)).count();
    matched as f64 / longest as f64
}

/// Open candidates whose location scores above [`MATCH_THRESHOLD`] against
/// the trip's destination, in their original order.
pub fn find_matches<'a, T, O>(trip: &T, candidates: &'a [O]) -> Vec<&'a O>
where
    T: TravelIntent + ?Sized,
    O: OrderRecord,
{
    candidates
        .iter()
        .filter(|order| {
            order.status() == OrderStatus::Open
                && score(trip.destination(), order.location()) > MATCH_THRESHOLD
        })
        .collect()
}

/// A trip together with the orders it could carry.
#[derive(Debug)]
pub struct TripMatches<'a, T, O> {
    pub trip: &'a T,
    pub orders: Vec<&'a O>,
}

/// Runs [`find_matches`] for every trip, keeping only trips with at least one match.
///
/// Trips keep their input order.
pub fn match_trips<'a, T, O>(trips: &'a [T], candidates: &'a [O]) -> Vec<TripMatches<'a, T, O>>
where
    T: TravelIntent,
    O: OrderRecord,
{
    let matched: Vec<_> = trips
        .iter()
        .filter_map(|trip| {
            let orders = find_matches(trip, candidates);
            (!orders.is_empty()).then_some(TripMatches { trip, orders })
        })
        .collect();

    debug!(
        trips = trips.len(),
        candidates = candidates.len(),
        matched = matched.len(),
        "matched trips against orders"
    );

    matched
}
