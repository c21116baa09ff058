//! Debug-only guard against re-entering a keyed container mid-probe.
//!
//! `IndexBase` hands control to user code (`K: Hash`, `K: Eq`) while it
//! hashes a key or walks a bucket chain. Code that reaches the same index
//! again through a raw pointer would see the chains and the key sequence
//! between two updates. Each probe opens a section named after the public
//! operation running it; opening a second section on the same index
//! panics and names both operations. Release builds keep no state.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    /// Operation holding the open section.
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _unsync: PhantomData,
        }
    }

    /// Open a probe section for `op`, e.g. `"IndexBase::find"`.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ProbeSection<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(active) = self.active.get() {
                panic!(
                    "re-entered keyed container: {} called while {} is probing",
                    op, active
                );
            }
            self.active.set(Some(op));
            ProbeSection { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            ProbeSection {
                _owner: PhantomData,
            }
        }
    }

    /// Operation currently probing; always `None` in release builds.
    #[cfg(test)]
    pub(crate) fn active(&self) -> Option<&'static str> {
        #[cfg(debug_assertions)]
        {
            self.active.get()
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    }
}

/// Open probe section; closes on drop, including during unwinding.
pub(crate) struct ProbeSection<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a DebugReentrancy>,
}

impl Drop for ProbeSection<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sections_close_on_drop() {
        let r = DebugReentrancy::new();
        {
            let _s = r.enter("IndexBase::find");
        }
        assert_eq!(r.active(), None);
        let _s = r.enter("IndexBase::put");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn active_names_the_open_operation() {
        let r = DebugReentrancy::new();
        let s = r.enter("IndexBase::find_add");
        assert_eq!(r.active(), Some("IndexBase::find_add"));
        drop(s);
        assert_eq!(r.active(), None);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "IndexBase::find_next called while IndexBase::find is probing")]
    fn nested_section_names_both_operations() {
        let r = DebugReentrancy::new();
        let _outer = r.enter("IndexBase::find");
        let _inner = r.enter("IndexBase::find_next");
    }

    // A panicking probe must not leave the index locked for later calls.
    #[cfg(debug_assertions)]
    #[test]
    fn unwinding_probe_releases_the_section() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("IndexBase::set");
            let _inner = r.enter("IndexBase::find");
        }));
        assert!(res.is_err());
        assert_eq!(r.active(), None);
        let _s = r.enter("IndexBase::find");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_sections_are_free_in_release() {
        let r = DebugReentrancy::new();
        let _outer = r.enter("IndexBase::find");
        let _inner = r.enter("IndexBase::find_next");
        assert_eq!(r.active(), None);
    }

    #[test]
    fn tracker_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<DebugReentrancy>();
    }
}
