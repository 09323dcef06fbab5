use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::item_store::ItemStore;
use crate::services::media::MediaUploader;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: Arc<dyn ItemStore>,
    media: Option<Arc<dyn MediaUploader>>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        store: Arc<dyn ItemStore>,
        media: Option<Arc<dyn MediaUploader>>,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, store, media }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn store(&self) -> &dyn ItemStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn media(&self) -> Option<&dyn MediaUploader> {
        self.inner.media.as_deref()
    }
}
