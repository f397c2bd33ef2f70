use std::time::SystemTime;

use crate::store::ResultStore;

/// Sweeps every search that hasn't been queried within the TTL window
/// and deletes it with the usual cascade. Returns the number removed.
pub fn sweep_expired(store: &impl ResultStore, now: SystemTime) -> usize {
    let expired: Vec<_> = store.all_searches().into_iter().filter(|s| s.is_expired(now)).map(|s| s.id).collect();
    for id in &expired {
        store.delete_search_cascading(*id);
    }
    expired.len()
}
