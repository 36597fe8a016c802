//! Run PyThaiNLP in a Docker sidecar and call it from Rust.
//!
//! A [`Manager`] owns one container: it creates or reuses it, injects the
//! HTTP service script, starts it and waits for its health check. Once ready,
//! Thai tokenization, romanization, transliteration, syllable segmentation
//! and combined analysis are plain async calls.
//!
//! ```rust,no_run
//! use pythainlp_sidecar::{CancellationToken, Manager};
//!
//! # async fn run() -> pythainlp_sidecar::Result<()> {
//! let manager = Manager::new().await?;
//! manager.init(&CancellationToken::new()).await?;
//!
//! let result = manager.tokenize("สวัสดีครับ").await?;
//! println!("{:?}", result.raw);
//!
//! manager.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod nlp;
pub mod registry;
pub mod sidecar;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Client, ServiceError};
pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use manager::{LifecycleState, Manager, ManagerBuilder};
pub use nlp::{
    AnalyzeOptions, AnalyzeResult, RomanizeOptions, RomanizeResult, SyllableTokenizeOptions,
    SyllableTokenizeResult, Token, TokenizeOptions, TokenizeResult, TransliterateOptions,
    TransliterateResult, extract_surfaces, join_tokens,
};
pub use registry::ManagerRegistry;
pub use tokio_util::sync::CancellationToken;
