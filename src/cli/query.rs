//! Text commands. Each one brings the sidecar up if needed, runs a single
//! operation and leaves the container running.

use clap::Subcommand;
use serde_json::{Value, json};

use pythainlp_sidecar::nlp::{AnalyzeOptions, FEATURE_ROMANIZE, FEATURE_TOKENIZE};
use pythainlp_sidecar::{Manager, Token, join_tokens};

use crate::cli::{Cli, ctrl_c_token};

#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommand {
    /// Split text into words
    Tokenize {
        text: String,

        /// Tokenizer engine (default: newmm)
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// Convert text to Latin script
    Romanize {
        text: String,

        /// Romanization engine (default: royin)
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// Convert text to a phonetic form
    Transliterate {
        text: String,

        /// Transliteration engine (default: thaig2p)
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// Split text into syllables
    Syllables {
        text: String,

        /// Syllable engine (default: han_solo)
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// Run several operations in one request
    Analyze {
        text: String,

        /// Features to run: tokenize, romanize, transliterate, syllable
        #[arg(short, long, value_delimiter = ',')]
        features: Vec<String>,
    },
}

/// Run a text command.
pub async fn run_query_command(cli: &Cli, cmd: &QueryCommand) -> anyhow::Result<()> {
    let manager = cli.manager().await?;
    manager.init(&ctrl_c_token()).await?;

    let result = query(&manager, cmd).await;
    manager.close().await?;
    let (plain, structured) = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&structured)?);
    } else {
        println!("{plain}");
    }
    Ok(())
}

/// Plain-text and JSON renderings of the command's result.
async fn query(manager: &Manager, cmd: &QueryCommand) -> anyhow::Result<(String, Value)> {
    Ok(match cmd {
        QueryCommand::Tokenize { text, engine } => {
            let r = manager
                .tokenize_with_engine(text, engine.as_deref().unwrap_or_default())
                .await?;
            (
                r.raw.join(" | "),
                json!({
                    "engine": r.engine,
                    "tokens": tokens_json(&r.tokens),
                    "processing_time_ms": millis(r.processing_time),
                }),
            )
        }
        QueryCommand::Romanize { text, engine } => {
            let r = manager
                .romanize_with_engine(text, engine.as_deref().unwrap_or_default())
                .await?;
            (
                r.text.clone(),
                json!({
                    "engine": r.engine,
                    "romanized": r.text,
                    "processing_time_ms": millis(r.processing_time),
                }),
            )
        }
        QueryCommand::Transliterate { text, engine } => {
            let r = manager
                .transliterate_with_engine(text, engine.as_deref().unwrap_or_default())
                .await?;
            (
                r.phonetic.clone(),
                json!({
                    "engine": r.engine,
                    "phonetic": r.phonetic,
                    "processing_time_ms": millis(r.processing_time),
                }),
            )
        }
        QueryCommand::Syllables { text, engine } => {
            let r = manager
                .syllable_tokenize_with_engine(text, engine.as_deref().unwrap_or_default())
                .await?;
            (
                r.syllables.join(" | "),
                json!({
                    "engine": r.engine,
                    "syllables": r.syllables,
                    "processing_time_ms": millis(r.processing_time),
                }),
            )
        }
        QueryCommand::Analyze { text, features } => {
            let features = if features.is_empty() {
                vec![FEATURE_TOKENIZE.to_string(), FEATURE_ROMANIZE.to_string()]
            } else {
                features.clone()
            };
            let r = manager
                .analyze_with_options(
                    text,
                    AnalyzeOptions {
                        features,
                        ..Default::default()
                    },
                )
                .await?;

            let mut plain: Vec<String> = r
                .tokens
                .iter()
                .map(|t| {
                    if t.romanization.is_empty() {
                        t.surface.clone()
                    } else {
                        format!("{}\t{}", t.surface, t.romanization)
                    }
                })
                .collect();
            if !r.phonetic.is_empty() {
                plain.push(format!("phonetic: {}", r.phonetic));
            }
            if !r.syllables.is_empty() {
                plain.push(format!("syllables: {}", r.syllables.join(" | ")));
            }
            if plain.is_empty() {
                plain.push(join_tokens(&r.raw_tokens));
            }

            (
                plain.join("\n"),
                json!({
                    "features": r.features,
                    "tokens": tokens_json(&r.tokens),
                    "romanized": r.romanized,
                    "phonetic": r.phonetic,
                    "syllables": r.syllables,
                    "processing_time_ms": millis(r.processing_time),
                }),
            )
        }
    })
}

fn tokens_json(tokens: &[Token]) -> Value {
    serde_json::to_value(tokens).unwrap_or(Value::Null)
}

fn millis(d: Option<std::time::Duration>) -> Value {
    d.map_or(Value::Null, |d| json!(d.as_micros() as f64 / 1000.0))
}
