//! substrate-containers: growable arrays, tombstoning hash indexes,
//! index-aligned maps, pointer-stable variants of all three, and a
//! small-buffer copy-on-write string.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: give higher layers explicit control over growth, aliasing,
//!   deletion and storage representation, with each layer written only
//!   against the one below it.
//! - Layers:
//!   - GrowableBuffer<T>: owned storage with 1.5x amortized growth.
//!   - Array<T>: positional container over GrowableBuffer; soft failures
//!     return `bool`, out-of-range access panics.
//!   - HashTable: 32-bit hashes to slot numbers, chained per bucket, with
//!     tombstones (`unlink`) reused by `put` and compacted by `sweep`.
//!   - IndexBase<K, C, S>: a key sequence `C` kept slot-for-slot aligned
//!     with a HashTable. `Index` stores keys in an `Array`, `ObjectIndex`
//!     in an `ObjectArray`.
//!   - MapBase<K, V, C, S>: an `Index` of keys plus a value sequence `C`
//!     mirrored on every key-side mutation. `Map` and `ObjectMap`.
//!   - CompactString: inline up to 14 bytes, else an `Rc` heap block
//!     cloned on first write while shared.
//!   - Pool<T>, RingBuffer<T>: small utilities on top of `Array`.
//!
//! Constraints
//! - Single-threaded: no locks, no atomics. Containers are `Send` when
//!   their elements are; CompactString is `!Send` (plain `Rc` count).
//! - Duplicate keys are allowed in indexes and maps; `find` returns the
//!   first live occurrence and `find_next` walks the rest.
//! - Tombstoned slots keep their position and stay visible to `get` and
//!   `iter`; only lookups skip them.
//! - Object* containers box every element, so an element's address
//!   survives any insert or remove that does not remove that element.
//!
//! Reentrancy policy
//! - Keyed containers call user code (`K: Hash + Eq`) while probing. A
//!   debug-only guard is held across every probe; re-entering the same
//!   container from that code panics in debug builds.
//! - Hashes are stored per slot, so growth and chain rebuilds never call
//!   `K: Hash`. Only `reindex` recomputes them.
//!
//! Preconditions
//! - Hard preconditions (index out of range) panic in every build.
//! - Verify-only preconditions (ascending removal lists, tombstone-only
//!   sweeps) are checked with `debug_assertions` or the `verify` feature.
//!   Without the check the result is memory-safe but unspecified.

mod verify;

pub mod array;
pub mod buffer;
pub mod error;
pub mod hash_table;
pub mod index;
mod index_proptest;
pub mod map;
pub mod object;
pub mod pool;
mod reentrancy;
pub mod ring;
pub mod sequence;
pub mod string;

// Public surface
pub use array::Array;
pub use buffer::GrowableBuffer;
pub use error::ContainerError;
pub use hash_table::HashTable;
pub use index::{Index, IndexBase, ObjectIndex};
pub use map::{Map, MapBase, ObjectMap};
pub use object::ObjectArray;
pub use pool::{Pool, PoolKey};
pub use ring::RingBuffer;
pub use sequence::Sequence;
pub use string::{CompactString, INLINE_CAPACITY};
