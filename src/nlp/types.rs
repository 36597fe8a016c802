//! Result, option and token types returned by the operation facades.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One token with whatever linguistic information the call produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The token text.
    pub surface: String,
    /// Romanized form, empty when not requested or not available.
    #[serde(default)]
    pub romanization: String,
    /// IPA or other phonetic form.
    #[serde(default)]
    pub ipa: String,
    /// Part-of-speech tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    /// Whether the token contains Thai script (as opposed to punctuation,
    /// digits, whitespace or foreign text).
    pub is_lexical: bool,
    /// Engine-specific extras.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub raw: Vec<String>,
    pub engine: String,
    /// `None` when the service did not report a timing.
    pub processing_time: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RomanizeResult {
    /// Full romanized text.
    pub text: String,
    /// Original tokens, when tokenized first.
    pub tokens: Vec<String>,
    /// Per-token romanization, when tokenized first.
    pub romanized_parts: Vec<String>,
    pub engine: String,
    pub processing_time: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransliterateResult {
    pub phonetic: String,
    pub engine: String,
    pub processing_time: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyllableTokenizeResult {
    pub syllables: Vec<String>,
    pub engine: String,
    pub processing_time: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeResult {
    /// Tokens paired with their romanization by position.
    pub tokens: Vec<Token>,
    pub raw_tokens: Vec<String>,
    pub romanized: String,
    pub romanized_parts: Vec<String>,
    pub phonetic: String,
    pub syllables: Vec<String>,
    /// Features that were requested.
    pub features: Vec<String>,
    pub processing_time: Option<Duration>,
}

/// Word tokenization engines.
pub const ENGINE_NEWMM: &str = "newmm";
pub const ENGINE_LONGEST: &str = "longest";
pub const ENGINE_ICU: &str = "icu";
pub const ENGINE_ATTACUT: &str = "attacut";
pub const ENGINE_DEEPCUT: &str = "deepcut";
pub const ENGINE_NERCUT: &str = "nercut";
pub const ENGINE_NLPO3: &str = "nlpo3";
pub const ENGINE_OSKUT: &str = "oskut";
pub const ENGINE_SEFR_CUT: &str = "sefr_cut";
pub const ENGINE_TLTK: &str = "tltk";

/// Romanization engines.
pub const ENGINE_ROYIN: &str = "royin";
pub const ENGINE_THAI2ROM: &str = "thai2rom";
pub const ENGINE_TLTK_ROM: &str = "tltk";
pub const ENGINE_LOOKUP: &str = "lookup";

/// Transliteration engines.
pub const ENGINE_THAIG2P: &str = "thaig2p";
pub const ENGINE_ICU_TRANS: &str = "icu";
pub const ENGINE_IPA: &str = "ipa";
pub const ENGINE_TLTK_G2P: &str = "tltk_g2p";
pub const ENGINE_ISO_11940: &str = "iso_11940";
pub const ENGINE_TLTK_IPA: &str = "tltk_ipa";
pub const ENGINE_THAIG2P_V2: &str = "thaig2p_v2";

/// Syllable tokenization engines.
pub const ENGINE_SYLLABLE_DICT: &str = "dict";
pub const ENGINE_SYLLABLE_HAN_SOLO: &str = "han_solo";
pub const ENGINE_SYLLABLE_SSG: &str = "ssg";
pub const ENGINE_SYLLABLE_TLTK: &str = "tltk";

pub const DEFAULT_TOKENIZE_ENGINE: &str = ENGINE_NEWMM;
pub const DEFAULT_ROMANIZE_ENGINE: &str = ENGINE_ROYIN;
pub const DEFAULT_TRANSLITERATE_ENGINE: &str = ENGINE_THAIG2P;
pub const DEFAULT_SYLLABLE_ENGINE: &str = ENGINE_SYLLABLE_HAN_SOLO;

/// Analyze features.
pub const FEATURE_TOKENIZE: &str = "tokenize";
pub const FEATURE_ROMANIZE: &str = "romanize";
pub const FEATURE_TRANSLITERATE: &str = "transliterate";
pub const FEATURE_SYLLABLE: &str = "syllable";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizeOptions {
    /// Empty selects [`DEFAULT_TOKENIZE_ENGINE`].
    pub engine: String,
    pub custom_dict: Vec<String>,
    /// `None` keeps PyThaiNLP's default (whitespace tokens are kept).
    pub keep_whitespace: Option<bool>,
    /// `None` keeps PyThaiNLP's default.
    pub join_broken_num: Option<bool>,
    /// Passed through to the engine as keyword arguments.
    pub extra: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RomanizeOptions {
    /// Empty selects [`DEFAULT_ROMANIZE_ENGINE`].
    pub engine: String,
    /// Tokenize first and romanize token by token.
    pub tokenize_first: bool,
    /// Fallback used by the `lookup` engine.
    pub fallback_engine: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransliterateOptions {
    /// Empty selects [`DEFAULT_TRANSLITERATE_ENGINE`].
    pub engine: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyllableTokenizeOptions {
    /// Empty selects [`DEFAULT_SYLLABLE_ENGINE`].
    pub engine: String,
    pub keep_whitespace: bool,
}

impl Default for SyllableTokenizeOptions {
    fn default() -> Self {
        Self {
            engine: String::new(),
            keep_whitespace: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeOptions {
    /// Empty requests tokenize + romanize.
    pub features: Vec<String>,
    pub tokenize_engine: String,
    pub romanize_engine: String,
    pub transliterate_engine: String,
    pub syllable_engine: String,
}

/// `engine`, or `default` when it is empty.
pub(crate) fn engine_or_default(engine: &str, default: &str) -> String {
    if engine.is_empty() {
        default.to_string()
    } else {
        engine.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        assert_eq!(engine_or_default("", DEFAULT_TOKENIZE_ENGINE), "newmm");
        assert_eq!(engine_or_default("", DEFAULT_ROMANIZE_ENGINE), "royin");
        assert_eq!(engine_or_default("", DEFAULT_TRANSLITERATE_ENGINE), "thaig2p");
        assert_eq!(engine_or_default("", DEFAULT_SYLLABLE_ENGINE), "han_solo");
        assert_eq!(engine_or_default("longest", DEFAULT_TOKENIZE_ENGINE), "longest");
    }
}
