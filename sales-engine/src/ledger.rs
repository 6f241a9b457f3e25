use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Per-product-type in-memory store. Entries append in arrival order; a key
/// can be cleared without being removed, so a cleared product type stays
/// observable with an empty list.
///
/// Reads hand out snapshot clones; a report built from [`fetch_all`] reflects
/// the store at a single instant even while the consumption path is writing.
///
/// [`fetch_all`]: CategoryLedger::fetch_all
pub struct CategoryLedger<T: Clone> {
    entries: RwLock<BTreeMap<String, Vec<T>>>,
}

impl<T: Clone> CategoryLedger<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Appends `entry` under `product_type`, creating the list if absent.
    /// The key is assumed pre-validated by the caller.
    pub fn record_for(&self, product_type: &str, entry: T) {
        self.entries
            .write()
            .entry(product_type.to_string())
            .or_default()
            .push(entry);
    }

    /// Snapshot of the entries for `product_type`; empty if never seen.
    pub fn fetch_for(&self, product_type: &str) -> Vec<T> {
        self.entries
            .read()
            .get(product_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Empties the list for `product_type` if it exists; never-seen keys are
    /// left absent rather than created.
    pub fn clear_for(&self, product_type: &str) {
        if let Some(list) = self.entries.write().get_mut(product_type) {
            list.clear();
        }
    }

    /// Runs `mutator` over every stored entry for `product_type` in insertion
    /// order, under a single write guard. Returns the number of entries
    /// visited.
    pub fn apply_for(&self, product_type: &str, mutator: impl FnMut(&mut T)) -> usize {
        let mut guard = self.entries.write();
        match guard.get_mut(product_type) {
            Some(list) => {
                list.iter_mut().for_each(mutator);
                list.len()
            }
            None => 0,
        }
    }

    /// Full snapshot copy keyed by product type.
    pub fn fetch_all(&self) -> BTreeMap<String, Vec<T>> {
        self.entries.read().clone()
    }
}

impl<T: Clone> Default for CategoryLedger<T> {
    fn default() -> Self {
        Self::new()
    }
}
