use crate::client::SyllableTokenizeRequest;
use crate::error::Result;
use crate::manager::Manager;
use crate::nlp::types::{
    DEFAULT_SYLLABLE_ENGINE, SyllableTokenizeOptions, SyllableTokenizeResult, engine_or_default,
};

impl Manager {
    /// Syllable segmentation with the default engine (`han_solo`).
    pub async fn syllable_tokenize(&self, text: &str) -> Result<SyllableTokenizeResult> {
        self.syllable_tokenize_with_engine(text, DEFAULT_SYLLABLE_ENGINE)
            .await
    }

    pub async fn syllable_tokenize_with_engine(
        &self,
        text: &str,
        engine: &str,
    ) -> Result<SyllableTokenizeResult> {
        let opts = SyllableTokenizeOptions {
            engine: engine.to_string(),
            ..Default::default()
        };
        self.syllable_tokenize_with_options(text, opts).await
    }

    pub async fn syllable_tokenize_with_options(
        &self,
        text: &str,
        opts: SyllableTokenizeOptions,
    ) -> Result<SyllableTokenizeResult> {
        self.ensure_ready()?;

        let req = SyllableTokenizeRequest {
            text: text.to_string(),
            engine: engine_or_default(&opts.engine, DEFAULT_SYLLABLE_ENGINE),
            keep_whitespace: opts.keep_whitespace,
        };

        let resp = self.client().syllable_tokenize(&req).await?;

        Ok(SyllableTokenizeResult {
            syllables: resp.syllables,
            engine: req.engine,
            processing_time: resp.metadata.processing_time(),
        })
    }
}
