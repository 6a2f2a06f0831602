use super::{ProjectData, StorageBackend};
use anyhow::Result;
use core::cell::{Cell, RefCell};
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt as _;

/// Keeps the last stored payload in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RefCell<Option<ProjectData>>,
    stores: Cell<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-filled with `data`.
    #[must_use]
    pub fn with_data(data: ProjectData) -> Self {
        Self {
            data: RefCell::new(Some(data)),
            stores: Cell::new(0),
        }
    }

    /// The last stored payload.
    #[must_use]
    pub fn data(&self) -> Option<ProjectData> {
        self.data.borrow().clone()
    }

    /// How many times `store` was called.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.get()
    }
}

impl StorageBackend for MemoryStorage {
    fn store<'call>(&'call self, data: &'call ProjectData) -> LocalBoxFuture<'call, Result<()>> {
        *self.data.borrow_mut() = Some(data.clone());
        self.stores.set(self.stores.get().saturating_add(1));
        future::ready(Ok(())).boxed_local()
    }

    fn load(&self) -> LocalBoxFuture<'_, Result<ProjectData>> {
        let data = self.data.borrow().clone().unwrap_or_default();
        future::ready(Ok(data)).boxed_local()
    }
}
