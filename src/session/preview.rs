//! Transient preview handles for selected images.
//!
//! A handle is a `blob:` style URL pointing at bytes held by the store. The
//! entry lives exactly as long as its handle, so replacing or discarding a
//! selection can never leak previews.

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::session::image::SelectedImage;

type Entries = Arc<DashMap<Uuid, Arc<[u8]>>>;

/// Store of live preview entries. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    inner: Entries,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview for `image` and return its owning handle.
    pub fn create(&self, image: &SelectedImage) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.inner.insert(id, image.shared_bytes());
        tracing::trace!(preview = %id, "Preview created");
        PreviewHandle {
            id,
            url: format!("blob:lungai/{}", id),
            entries: Arc::clone(&self.inner),
        }
    }

    /// Bytes behind a preview URL, if it is still live.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url.strip_prefix("blob:lungai/")?.parse::<Uuid>().ok()?;
        self.inner.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of previews not yet released.
    pub fn live_count(&self) -> usize {
        self.inner.len()
    }
}

/// Owning reference to a preview entry; dropping it releases the entry.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    entries: Entries,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.entries.remove(&self.id);
        tracing::trace!(preview = %self.id, "Preview released");
    }
}
