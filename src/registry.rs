//! Shared default manager.
//!
//! Applications that want one sidecar per process own a [`ManagerRegistry`]
//! and pass it around instead of threading a [`Manager`] through every call
//! site. The manager is created lazily on first use.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::ManagerConfig;
use crate::error::Result;
use crate::manager::{Manager, ManagerBuilder};
use crate::nlp::{
    AnalyzeResult, RomanizeResult, SyllableTokenizeResult, TokenizeResult, TransliterateResult,
};

type BuilderFactory = Box<dyn Fn() -> ManagerBuilder + Send + Sync>;

/// Holds at most one [`Manager`] and creates it on demand.
pub struct ManagerRegistry {
    factory: BuilderFactory,
    current: Mutex<Option<Arc<Manager>>>,
}

impl std::fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerRegistry").finish_non_exhaustive()
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl ManagerRegistry {
    /// Registry whose managers are built from `config`.
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_factory(move || ManagerBuilder::from_config(config.clone()))
    }

    /// Registry whose managers are built from whatever `factory` returns.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> ManagerBuilder + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            current: Mutex::new(None),
        }
    }

    /// The current manager, building one if there is none.
    pub async fn get_or_create(&self) -> Result<Arc<Manager>> {
        let mut current = self.current.lock().await;
        if let Some(manager) = current.as_ref() {
            return Ok(Arc::clone(manager));
        }

        tracing::debug!("Creating default PyThaiNLP manager");
        let manager = Arc::new((self.factory)().build().await?);
        *current = Some(Arc::clone(&manager));
        Ok(manager)
    }

    /// Replace the current manager. The previous one is not closed.
    pub async fn set(&self, manager: Arc<Manager>) {
        *self.current.lock().await = Some(manager);
    }

    /// Forget the current manager without closing it.
    pub async fn clear(&self) {
        self.current.lock().await.take();
    }

    /// Whether a manager has been created or set.
    pub async fn is_set(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// Close the current manager, if any, and forget it.
    pub async fn close(&self) -> Result<()> {
        let manager = self.current.lock().await.take();
        match manager {
            Some(manager) => manager.close().await,
            None => Ok(()),
        }
    }

    /// Initialize the current manager, creating it first if needed.
    pub async fn init(&self, cancel: &CancellationToken) -> Result<()> {
        self.get_or_create().await?.init(cancel).await
    }

    /// Recreate the container behind the current manager and initialize.
    pub async fn init_recreate(&self, no_cache: bool, cancel: &CancellationToken) -> Result<()> {
        self.get_or_create()
            .await?
            .init_recreate(no_cache, cancel)
            .await
    }

    pub async fn tokenize(&self, text: &str) -> Result<TokenizeResult> {
        self.get_or_create().await?.tokenize(text).await
    }

    pub async fn romanize(&self, text: &str) -> Result<RomanizeResult> {
        self.get_or_create().await?.romanize(text).await
    }

    pub async fn transliterate(&self, text: &str) -> Result<TransliterateResult> {
        self.get_or_create().await?.transliterate(text).await
    }

    pub async fn syllable_tokenize(&self, text: &str) -> Result<SyllableTokenizeResult> {
        self.get_or_create().await?.syllable_tokenize(text).await
    }

    pub async fn analyze_text(&self, text: &str) -> Result<AnalyzeResult> {
        self.get_or_create().await?.analyze_text(text).await
    }
}
