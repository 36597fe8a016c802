//! Script detection and token helpers.

use crate::nlp::types::Token;

/// Thai Unicode block.
const THAI_BLOCK: std::ops::RangeInclusive<char> = '\u{0E00}'..='\u{0E7F}';

/// Whether `text` contains at least one Thai codepoint.
pub fn is_thai_text(text: &str) -> bool {
    text.chars().any(|c| THAI_BLOCK.contains(&c))
}

/// A token carrying only its surface and script classification.
pub fn lexical_token(surface: impl Into<String>) -> Token {
    let surface = surface.into();
    Token {
        is_lexical: is_thai_text(&surface),
        surface,
        ..Default::default()
    }
}

/// Pair tokens with romanized parts by position. Tokens past the end of
/// `parts` get an empty romanization; surplus parts are ignored.
pub fn pair_romanizations(tokens: &[String], parts: &[String]) -> Vec<Token> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, surface)| Token {
            romanization: parts.get(i).cloned().unwrap_or_default(),
            ..lexical_token(surface.as_str())
        })
        .collect()
}

/// Join tokens back into text. Thai is written without spaces, so a space is
/// inserted only between two adjacent non-Thai tokens.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        if i > 0 && !is_thai_text(token) && !is_thai_text(tokens[i - 1].as_ref()) {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

/// The surface text of each token.
pub fn extract_surfaces(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.surface.clone()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_thai_text() {
        assert!(is_thai_text("สวัสดี"));
        assert!(is_thai_text("abc ก"));
        assert!(is_thai_text("๑๒๓"));
        assert!(!is_thai_text("123"));
        assert!(!is_thai_text(""));
        assert!(!is_thai_text("hello, world"));
        assert!(!is_thai_text(" "));
    }

    #[test]
    fn test_pair_equal_lengths() {
        let tokens = pair_romanizations(
            &strings(&["สวัสดี", "ครับ"]),
            &strings(&["sawatdi", "khrap"]),
        );

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].surface, "สวัสดี");
        assert_eq!(tokens[0].romanization, "sawatdi");
        assert_eq!(tokens[1].romanization, "khrap");
        assert!(tokens.iter().all(|t| t.is_lexical));
    }

    #[test]
    fn test_pair_fewer_parts_leaves_tail_empty() {
        let tokens = pair_romanizations(
            &strings(&["สวัสดี", "ครับ", "!"]),
            &strings(&["sawatdi", "khrap"]),
        );

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].surface, "!");
        assert_eq!(tokens[2].romanization, "");
        assert!(!tokens[2].is_lexical);
    }

    #[test]
    fn test_pair_surplus_parts_ignored() {
        let tokens = pair_romanizations(&strings(&["ครับ"]), &strings(&["khrap", "extra"]));
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].romanization, "khrap");
    }

    #[test]
    fn test_join_tokens() {
        assert_eq!(join_tokens(&["สวัสดี", "ครับ"]), "สวัสดีครับ");
        assert_eq!(join_tokens(&["hello", "world"]), "hello world");
        assert_eq!(join_tokens(&["ผม", "ชื่อ", "Coco", "2024"]), "ผมชื่อCoco 2024");
        assert_eq!(join_tokens::<&str>(&[]), "");
    }

    #[test]
    fn test_extract_surfaces() {
        let tokens = vec![lexical_token("ภาษา"), lexical_token("ไทย")];
        assert_eq!(extract_surfaces(&tokens), strings(&["ภาษา", "ไทย"]));
    }
}
