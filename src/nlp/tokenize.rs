use crate::client::TokenizeRequest;
use crate::error::Result;
use crate::manager::Manager;
use crate::nlp::text::lexical_token;
use crate::nlp::types::{
    DEFAULT_TOKENIZE_ENGINE, TokenizeOptions, TokenizeResult, engine_or_default,
};

impl Manager {
    /// Word tokenization with the default engine (`newmm`).
    pub async fn tokenize(&self, text: &str) -> Result<TokenizeResult> {
        self.tokenize_with_engine(text, DEFAULT_TOKENIZE_ENGINE).await
    }

    /// Word tokenization with a specific engine.
    pub async fn tokenize_with_engine(&self, text: &str, engine: &str) -> Result<TokenizeResult> {
        let opts = TokenizeOptions {
            engine: engine.to_string(),
            ..Default::default()
        };
        self.tokenize_with_options(text, opts).await
    }

    /// Word tokenization with full options.
    pub async fn tokenize_with_options(
        &self,
        text: &str,
        opts: TokenizeOptions,
    ) -> Result<TokenizeResult> {
        self.ensure_ready()?;

        let req = TokenizeRequest {
            text: text.to_string(),
            engine: engine_or_default(&opts.engine, DEFAULT_TOKENIZE_ENGINE),
            custom_dict: opts.custom_dict,
            keep_whitespace: opts.keep_whitespace,
            join_broken_num: opts.join_broken_num,
            options: opts.extra,
        };

        let resp = self.client().tokenize(&req).await?;

        Ok(TokenizeResult {
            tokens: resp.tokens.iter().map(|t| lexical_token(t.as_str())).collect(),
            raw: resp.tokens,
            engine: req.engine,
            processing_time: resp.metadata.processing_time(),
        })
    }
}
