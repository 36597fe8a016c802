//! Combined analysis in one round trip.

use crate::client::AnalyzeRequest;
use crate::error::Result;
use crate::manager::Manager;
use crate::nlp::text::pair_romanizations;
use crate::nlp::types::{AnalyzeOptions, AnalyzeResult, FEATURE_ROMANIZE, FEATURE_TOKENIZE};

fn default_features() -> Vec<String> {
    vec![FEATURE_TOKENIZE.to_string(), FEATURE_ROMANIZE.to_string()]
}

impl Manager {
    /// Tokenize and romanize.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalyzeResult> {
        let opts = AnalyzeOptions {
            features: default_features(),
            ..Default::default()
        };
        self.analyze_with_options(text, opts).await
    }

    /// Run the requested features. Tokens are paired with romanized parts by
    /// position; see [`pair_romanizations`] for the length-mismatch policy.
    pub async fn analyze_with_options(
        &self,
        text: &str,
        opts: AnalyzeOptions,
    ) -> Result<AnalyzeResult> {
        self.ensure_ready()?;

        let features = if opts.features.is_empty() {
            default_features()
        } else {
            opts.features
        };

        let req = AnalyzeRequest {
            text: text.to_string(),
            features,
            tokenize_engine: opts.tokenize_engine,
            romanize_engine: opts.romanize_engine,
            transliterate_engine: opts.transliterate_engine,
            syllable_engine: opts.syllable_engine,
        };

        let resp = self.client().analyze(&req).await?;
        let data = resp.data;

        if !data.romanized_tokens.is_empty() && data.romanized_tokens.len() != data.tokens.len() {
            tracing::debug!(
                tokens = data.tokens.len(),
                romanized = data.romanized_tokens.len(),
                "Romanized parts do not line up with tokens"
            );
        }

        Ok(AnalyzeResult {
            tokens: pair_romanizations(&data.tokens, &data.romanized_tokens),
            raw_tokens: data.tokens,
            romanized: data.romanized,
            romanized_parts: data.romanized_tokens,
            phonetic: data.phonetic,
            syllables: data.syllables,
            features: req.features,
            processing_time: resp.metadata.processing_time(),
        })
    }

    /// Alias of [`Manager::analyze_text`].
    pub async fn tokenize_and_romanize(&self, text: &str) -> Result<AnalyzeResult> {
        self.analyze_text(text).await
    }
}
