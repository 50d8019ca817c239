//! Per-thread tracking of discovery work in progress.
//!
//! Factories, listers and unit loaders may call back into the registry. A
//! callback that reaches the lookup or load it was started from would block
//! on itself forever, so such calls are refused instead and the construction
//! that caused them is marked as failed.

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashSet;

thread_local! {
	static ACTIVE: RefCell<FxHashSet<(usize, String)>> = RefCell::default();
	static REFUSED: Cell<bool> = const { Cell::new(false) };
}

/// Marks `(scope, key)` as in progress on the current thread until dropped.
#[derive(Debug)]
pub(crate) struct InProgress {
	scope: usize,
	key: String,
}

impl InProgress {
	/// Returns `None` if the same `(scope, key)` is already in progress on
	/// this thread, and records the refusal.
	pub(crate) fn enter(scope: usize, key: &str) -> Option<Self> {
		let entered = ACTIVE.with_borrow_mut(|active| active.insert((scope, key.to_owned())));
		if !entered {
			REFUSED.set(true);
			return None;
		}
		Some(Self { scope, key: key.to_owned() })
	}
}

impl Drop for InProgress {
	fn drop(&mut self) {
		let entry = (self.scope, std::mem::take(&mut self.key));
		ACTIVE.with_borrow_mut(|active| active.remove(&entry));
	}
}

/// Whether a re-entrant call was refused since the last check; clears the flag.
pub(crate) fn take_refused() -> bool {
	REFUSED.replace(false)
}
