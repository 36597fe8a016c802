//! Operation facades on [`Manager`](crate::Manager).
//!
//! Each operation comes in three shapes: default engine, engine override and
//! full options. All of them fail with [`Error::NotReady`](crate::Error::NotReady)
//! before any request is sent when the manager has not finished `init`.

mod analyze;
mod romanize;
mod syllable;
pub mod text;
mod tokenize;
pub mod types;

pub use text::{extract_surfaces, is_thai_text, join_tokens, pair_romanizations};
pub use types::*;
