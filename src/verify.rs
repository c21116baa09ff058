//! Precondition checks that are too costly for every release call.
//!
//! Hard preconditions (index in range, removal range inside the
//! container) use `assert!` directly and are fatal in every build.
//! `verify!` guards the rest: strictly ascending removal lists, hash
//! chain bookkeeping, tombstone state. It is active with
//! `debug_assertions` or the `verify` feature. Without it the condition
//! is type-checked but never evaluated, and violating it leaves the
//! container memory-safe but its contents unspecified.

macro_rules! verify {
    ($($arg:tt)+) => {
        if cfg!(any(debug_assertions, feature = "verify")) {
            assert!($($arg)+);
        }
    };
}

pub(crate) use verify;

/// True when `indices` is strictly ascending and every entry is `< bound`.
pub(crate) fn is_strictly_ascending(indices: &[usize], bound: usize) -> bool {
    indices.windows(2).all(|w| w[0] < w[1]) && indices.last().map_or(true, |&i| i < bound)
}
