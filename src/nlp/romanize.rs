//! Romanization and phonetic transliteration.

use crate::client::{RomanizeRequest, TransliterateRequest};
use crate::error::Result;
use crate::manager::Manager;
use crate::nlp::types::{
    DEFAULT_ROMANIZE_ENGINE, DEFAULT_TRANSLITERATE_ENGINE, RomanizeOptions, RomanizeResult,
    TransliterateOptions, TransliterateResult, engine_or_default,
};

impl Manager {
    /// Romanization with the default engine (`royin`).
    pub async fn romanize(&self, text: &str) -> Result<RomanizeResult> {
        self.romanize_with_engine(text, DEFAULT_ROMANIZE_ENGINE).await
    }

    pub async fn romanize_with_engine(&self, text: &str, engine: &str) -> Result<RomanizeResult> {
        let opts = RomanizeOptions {
            engine: engine.to_string(),
            ..Default::default()
        };
        self.romanize_with_options(text, opts).await
    }

    pub async fn romanize_with_options(
        &self,
        text: &str,
        opts: RomanizeOptions,
    ) -> Result<RomanizeResult> {
        self.ensure_ready()?;

        let req = RomanizeRequest {
            text: text.to_string(),
            engine: engine_or_default(&opts.engine, DEFAULT_ROMANIZE_ENGINE),
            tokenize: opts.tokenize_first,
            fallback_engine: opts.fallback_engine,
        };

        let resp = self.client().romanize(&req).await?;

        Ok(RomanizeResult {
            text: resp.romanized,
            tokens: resp.tokens,
            romanized_parts: resp.romanized_tokens,
            engine: req.engine,
            processing_time: resp.metadata.processing_time(),
        })
    }

    /// Phonetic transliteration with the default engine (`thaig2p`).
    pub async fn transliterate(&self, text: &str) -> Result<TransliterateResult> {
        self.transliterate_with_engine(text, DEFAULT_TRANSLITERATE_ENGINE)
            .await
    }

    pub async fn transliterate_with_engine(
        &self,
        text: &str,
        engine: &str,
    ) -> Result<TransliterateResult> {
        let opts = TransliterateOptions {
            engine: engine.to_string(),
        };
        self.transliterate_with_options(text, opts).await
    }

    pub async fn transliterate_with_options(
        &self,
        text: &str,
        opts: TransliterateOptions,
    ) -> Result<TransliterateResult> {
        self.ensure_ready()?;

        let req = TransliterateRequest {
            text: text.to_string(),
            engine: engine_or_default(&opts.engine, DEFAULT_TRANSLITERATE_ENGINE),
        };

        let resp = self.client().transliterate(&req).await?;

        Ok(TransliterateResult {
            phonetic: resp.phonetic,
            engine: req.engine,
            processing_time: resp.metadata.processing_time(),
        })
    }

    /// Alias of [`Manager::transliterate`], after PyThaiNLP's `pronunciate`.
    pub async fn pronunciate(&self, text: &str) -> Result<TransliterateResult> {
        self.transliterate(text).await
    }
}
