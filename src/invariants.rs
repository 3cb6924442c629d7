//! Runtime invariant checks with contract-test bookkeeping
//!
//! Production code asserts its internal invariants through
//! [`assert_invariant!`]. Every check is recorded per thread, so a test can
//! drive a scenario and then require that the relevant invariants were
//! actually exercised on the way.
//!
//! ```rust,ignore
//! use roomview::invariants::{clear_invariant_log, contract_test};
//!
//! clear_invariant_log();
//! // ... toggle fullscreen, resize, let the debounce settle ...
//! contract_test("fullscreen adaptation", &[
//!     roomview::invariants::ADAPT_LAYERED_ONLY,
//! ]);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;

/// Change notifications carry gap-free, increasing sequence numbers.
pub const EVENT_SEQUENCE_GAP_FREE: &str = "Room events are sequenced without gaps";
/// The controller never hands a simple consumer to the transport.
pub const ADAPT_LAYERED_ONLY: &str = "Adaptation requests target layered consumers only";
/// A timer never has two hide tasks in flight.
pub const SINGLE_PENDING_HIDE: &str = "At most one hide timer is pending per region";

thread_local! {
    static CHECKED: RefCell<BTreeMap<String, usize>> = RefCell::new(BTreeMap::new());
}

/// Assert an internal invariant, recording that it was checked.
///
/// Panics with the invariant text (and optional context) when the condition
/// does not hold.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $invariant:expr) => {
        $crate::invariants::__check($condition, $invariant, None)
    };
    ($condition:expr, $invariant:expr, $context:expr) => {
        $crate::invariants::__check($condition, $invariant, Some($context))
    };
}

#[doc(hidden)]
pub fn __check(condition: bool, invariant: &str, context: Option<&str>) {
    CHECKED.with(|checked| {
        *checked.borrow_mut().entry(invariant.to_string()).or_insert(0) += 1;
    });

    if !condition {
        panic!(
            "INVARIANT VIOLATION [{}]: {}",
            context.unwrap_or("roomview"),
            invariant
        );
    }
}

/// How many times `invariant` was checked on this thread since the last clear.
pub fn times_checked(invariant: &str) -> usize {
    CHECKED.with(|checked| checked.borrow().get(invariant).copied().unwrap_or(0))
}

/// Panic unless every listed invariant was checked at least once.
pub fn contract_test(scenario: &str, required: &[&str]) {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|invariant| times_checked(invariant) == 0)
        .collect();

    if !missing.is_empty() {
        panic!(
            "CONTRACT FAILURE [{}]: invariants never checked:\n  - {}",
            scenario,
            missing.join("\n  - ")
        );
    }
}

pub fn clear_invariant_log() {
    CHECKED.with(|checked| checked.borrow_mut().clear());
}
