//! Work queue construction
//!
//! The queue is the discovered handles minus the already-muted ones, shuffled
//! so the mute order does not follow directory order.

use rand::Rng;

use crate::models::{Handle, HandleSet};

/// Ordered work queue plus how many discovered handles were already muted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub queue: Vec<Handle>,
    pub skipped: usize,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Build the shuffled work queue `discovered - existing`
///
/// # Examples
///
/// ```
/// use glasswall::models::{Handle, HandleSet};
/// use glasswall::pipeline::reconcile::reconcile;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let discovered: HandleSet = ["alice", "bob", "Carol"].into_iter().map(Handle::new).collect();
/// let existing: HandleSet = [Handle::new("alice")].into_iter().collect();
///
/// let result = reconcile(&discovered, &existing, &mut ChaCha8Rng::seed_from_u64(7));
/// assert_eq!(result.queue.len(), 2);
/// assert_eq!(result.skipped, 1);
/// ```
pub fn reconcile<R: Rng + ?Sized>(
    discovered: &HandleSet,
    existing: &HandleSet,
    rng: &mut R,
) -> Reconciliation {
    let mut queue: Vec<Handle> = discovered.difference(existing).cloned().collect();
    let skipped = discovered.len() - queue.len();

    shuffle(&mut queue, rng);

    Reconciliation { queue, skipped }
}

/// In-place Fisher-Yates shuffle
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
