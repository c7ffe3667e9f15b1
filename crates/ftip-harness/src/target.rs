#![forbid(unsafe_code)]

//! Mock trigger targets.

use std::cell::Cell;
use std::rc::Rc;

use ftip::TargetInstance;

/// A target identified by `id`. Clones share the destroyed flag.
#[derive(Debug, Clone)]
pub struct MockTarget {
    pub id: u32,
    destroyed: Rc<Cell<bool>>,
}

impl MockTarget {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            destroyed: Rc::new(Cell::new(false)),
        }
    }

    /// Mark this target destroyed, as an engine would when the trigger
    /// element goes away first.
    pub fn destroy(&self) {
        self.destroyed.set(true);
    }
}

impl PartialEq for MockTarget {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MockTarget {}

impl TargetInstance for MockTarget {
    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

/// Ids of `targets`, in order.
#[must_use]
pub fn ids(targets: &[MockTarget]) -> Vec<u32> {
    targets.iter().map(|t| t.id).collect()
}
