use crate::descriptor::{DescriptorSummary, MethodDescriptor, MethodKey};
use crate::errors::InvokeResult;
use crate::invoker::generator::GeneratedInvoker;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type Slot = Arc<OnceCell<GeneratedInvoker>>;

/// **INVOKER CACHE**
///
/// Memoizes generated invokers by descriptor identity. Each key owns its own
/// cell, so generation for one key serializes concurrent callers of that key
/// only; the map lock is held just long enough to find or insert the cell.
/// Entries live as long as the cache.
#[derive(Default)]
pub struct InvokerCache {
    entries: RwLock<HashMap<MethodKey, Slot>>,
}

impl InvokerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the invoker cached for `descriptor`, running `generate` at most
    /// once per key when there is none. A failed generation leaves the key
    /// empty so a later call can retry.
    pub fn get_or_create<F>(
        &self,
        descriptor: &MethodDescriptor,
        generate: F,
    ) -> InvokeResult<GeneratedInvoker>
    where
        F: FnOnce() -> InvokeResult<GeneratedInvoker>,
    {
        let slot = self.slot_for(descriptor.key());
        if let Some(invoker) = slot.get() {
            log::trace!("invoker cache hit for {}", descriptor.qualified_name());
            return Ok(Arc::clone(invoker));
        }

        let invoker = slot.get_or_try_init(|| {
            log::debug!("invoker cache miss for {}", descriptor.signature());
            generate()
        })?;
        Ok(Arc::clone(invoker))
    }

    /// Cached invoker for `key`, if generation already completed.
    pub fn get(&self, key: &MethodKey) -> Option<GeneratedInvoker> {
        self.entries.read().get(key)?.get().cloned()
    }

    pub fn contains(&self, key: &MethodKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of generated invokers.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptors of every generated invoker, ordered by signature.
    pub fn snapshot(&self) -> Vec<DescriptorSummary> {
        let mut summaries: Vec<DescriptorSummary> = self
            .entries
            .read()
            .values()
            .filter_map(|slot| slot.get())
            .map(|invoker| invoker.descriptor().summary())
            .collect();
        summaries.sort_by(|a, b| a.signature.cmp(&b.signature));
        summaries
    }

    fn slot_for(&self, key: &MethodKey) -> Slot {
        if let Some(slot) = self.entries.read().get(key) {
            return Arc::clone(slot);
        }
        let mut entries = self.entries.write();
        Arc::clone(
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }
}

impl std::fmt::Debug for InvokerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokerCache")
            .field("entries", &self.len())
            .finish()
    }
}
