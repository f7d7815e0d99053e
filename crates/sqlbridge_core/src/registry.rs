//! Sharded handle registry.

use crate::handle::{Handle, HandleAllocator};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Default number of shards per registry.
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Maps handles to owned resources.
///
/// The registry is split into independently locked shards; handle `h`
/// lives in shard `h % shard_count`. Operations on handles in different
/// shards never contend.
///
/// # Invariants
///
/// - A handle present in the registry addresses exactly one resource
/// - Handles come from the registry's own allocator and are never reused
/// - Once `remove` returns a resource, no later `get` or `remove` on that
///   handle can observe it
///
/// Resources are stored behind `Arc` so that `get` can hand out a reference
/// without holding the shard lock while the caller works with it.
pub struct Registry<T> {
    allocator: HandleAllocator,
    shards: Box<[Mutex<HashMap<Handle, Arc<T>>>]>,
    len: AtomicUsize,
}

impl<T> Registry<T> {
    /// Creates a registry with [`DEFAULT_SHARD_COUNT`] shards.
    #[must_use]
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }

    /// Creates a registry with the given number of shards (at least one).
    #[must_use]
    pub fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            allocator: HandleAllocator::new(),
            shards,
            len: AtomicUsize::new(0),
        }
    }

    fn shard(&self, handle: Handle) -> &Mutex<HashMap<Handle, Arc<T>>> {
        let idx = (handle.as_u64() % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Stores a resource under a freshly allocated handle.
    pub fn insert(&self, resource: T) -> Handle {
        let handle = self.allocator.next();
        let mut shard = self.shard(handle).lock();
        // Count before the handle becomes removable.
        self.len.fetch_add(1, Ordering::Relaxed);
        shard.insert(handle, Arc::new(resource));
        handle
    }

    /// Looks up a live resource.
    pub fn get(&self, handle: Handle) -> Option<Arc<T>> {
        self.shard(handle).lock().get(&handle).cloned()
    }

    /// Runs `f` against a live resource while its shard is locked.
    pub fn with<R>(&self, handle: Handle, f: impl FnOnce(&T) -> R) -> Option<R> {
        let shard = self.shard(handle).lock();
        shard.get(&handle).map(|resource| f(resource))
    }

    /// Returns true if the handle is live.
    pub fn contains(&self, handle: Handle) -> bool {
        self.shard(handle).lock().contains_key(&handle)
    }

    /// Detaches a resource, making its handle permanently dead.
    ///
    /// The caller becomes responsible for releasing whatever native state
    /// the resource owns.
    pub fn remove(&self, handle: Handle) -> Option<Arc<T>> {
        let mut shard = self.shard(handle).lock();
        let removed = shard.remove(&handle);
        if removed.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    /// Detaches every live resource, in handle order.
    pub fn drain(&self) -> Vec<(Handle, Arc<T>)> {
        let mut drained = Vec::new();
        for shard in self.shards.iter() {
            let mut shard = shard.lock();
            let taken = shard.len();
            drained.extend(shard.drain());
            self.len.fetch_sub(taken, Ordering::Relaxed);
        }
        drained.sort_by_key(|(handle, _)| *handle);
        drained
    }

    /// Returns the number of live resources.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns true if no resource is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns how many handles this registry has ever issued.
    pub fn issued(&self) -> u64 {
        self.allocator.issued()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("shards", &self.shards.len())
            .field("live", &self.len())
            .field("issued", &self.issued())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    #[test]
    fn insert_get_remove() {
        let reg = Registry::new();
        let h = reg.insert("alpha".to_string());

        assert_eq!(reg.get(h).as_deref().map(String::as_str), Some("alpha"));
        assert!(reg.contains(h));
        assert_eq!(reg.len(), 1);

        let removed = reg.remove(h).unwrap();
        assert_eq!(removed.as_str(), "alpha");
        assert!(reg.get(h).is_none());
        assert!(reg.remove(h).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn handles_are_not_reused_after_remove() {
        let reg = Registry::with_shards(2);
        let a = reg.insert(1u32);
        reg.remove(a);
        let b = reg.insert(2u32);

        assert_ne!(a, b);
        assert!(b > a);
        assert!(reg.get(a).is_none());
        assert_eq!(reg.issued(), 2);
    }

    #[test]
    fn with_runs_under_lock() {
        let reg = Registry::new();
        let h = reg.insert(vec![1, 2, 3]);

        assert_eq!(reg.with(h, |v| v.len()), Some(3));
        reg.remove(h);
        assert_eq!(reg.with(h, |v| v.len()), None);
    }

    #[test]
    fn zero_shards_is_clamped() {
        let reg: Registry<()> = Registry::with_shards(0);
        assert_eq!(reg.shard_count(), 1);
        let h = reg.insert(());
        assert!(reg.contains(h));
    }

    #[test]
    fn drain_empties_in_handle_order() {
        let reg = Registry::with_shards(4);
        let handles: Vec<_> = (0..10).map(|i| reg.insert(i)).collect();

        let drained = reg.drain();
        let drained_handles: Vec<_> = drained.iter().map(|(h, _)| *h).collect();
        assert_eq!(drained_handles, handles);
        assert!(reg.is_empty());
        assert!(reg.get(handles[0]).is_none());
    }

    #[test]
    fn live_count_never_exceeds_issued_when_removing_fresh_handles() {
        let reg = Arc::new(Registry::with_shards(4));
        let done = Arc::new(AtomicBool::new(false));

        let inserter = {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                for i in 0..20_000u32 {
                    reg.insert(i);
                }
            })
        };
        let remover = {
            let reg = Arc::clone(&reg);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let newest = i64::try_from(reg.issued()).unwrap();
                    if let Some(h) = Handle::from_raw(newest) {
                        reg.remove(h);
                    }
                }
            })
        };
        let watcher = {
            let reg = Arc::clone(&reg);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let live = reg.len() as u64;
                    assert!(live <= reg.issued(), "live count {live} exceeds issued");
                }
            })
        };

        inserter.join().unwrap();
        done.store(true, Ordering::Relaxed);
        remover.join().unwrap();
        watcher.join().unwrap();

        let live = reg.len();
        assert!(live as u64 <= reg.issued());
        assert_eq!(reg.drain().len(), live);
        assert!(reg.is_empty());
    }

    #[test]
    fn concurrent_insert_and_remove() {
        let reg = Arc::new(Registry::with_shards(8));
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || {
                    let mut kept = Vec::new();
                    for i in 0..500 {
                        let h = reg.insert(t * 1_000 + i);
                        if i % 2 == 0 {
                            assert_eq!(*reg.remove(h).unwrap(), t * 1_000 + i);
                        } else {
                            kept.push(h);
                        }
                    }
                    kept
                })
            })
            .collect();

        let mut kept = HashSet::new();
        for t in threads {
            for h in t.join().unwrap() {
                assert!(kept.insert(h));
            }
        }
        assert_eq!(reg.len(), kept.len());
        assert_eq!(reg.issued(), 4_000);
        for h in kept {
            assert!(reg.contains(h));
        }
    }
}
