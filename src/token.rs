//! Positioned tokens and the whitespace/line lexical index.
//!
//! Tokenization is deliberately dumb: each input line is one sentence,
//! each whitespace-separated run is one token. Character offsets address
//! the sentence's *rendered* text, where tokens are joined by a single
//! space, so `char_end_index` of one token is always one less than
//! `char_start_index` of the next.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single whitespace-delimited token within one sentence.
///
/// Tokens are created once, at load time, and are never removed — only
/// their `tags` list changes as spans covering them gain or lose labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token text. Never blank.
    pub content: String,
    /// 1-based sentence (line) index.
    pub sen_index: usize,
    /// 0-based position within the sentence.
    pub tok_index: usize,
    /// Character offset of the first character, within the rendered line.
    pub char_start_index: usize,
    /// Character offset one past the last character (half-open).
    pub char_end_index: usize,
    /// Token identifier, `sen_index:tok_index` unless supplied.
    #[serde(default)]
    pub id: String,
    /// BIO tag entries (`B-X`, `I-X`) mirroring span membership.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Token {
    /// Create a token with a derived id and no tags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when `content` is blank.
    pub fn new(
        content: impl Into<String>,
        sen_index: usize,
        tok_index: usize,
        char_start_index: usize,
        char_end_index: usize,
    ) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::invalid_input("token content must not be blank"));
        }
        Ok(Self {
            content,
            sen_index,
            tok_index,
            char_start_index,
            char_end_index,
            id: Self::derived_id(sen_index, tok_index),
            tags: Vec::new(),
        })
    }

    /// The canonical id for a `(sentence, token)` position.
    #[must_use]
    pub fn derived_id(sen_index: usize, tok_index: usize) -> String {
        format!("{sen_index}:{tok_index}")
    }

    /// Fill in the derived id when a deserialized token arrived without one.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Self::derived_id(self.sen_index, self.tok_index);
        }
    }

    /// Whether the rendered character position falls on this token.
    ///
    /// Boundaries are inclusive on both sides, so the separator position
    /// immediately after a token still resolves to it.
    #[must_use]
    pub fn contains_char(&self, sen_index: usize, char_index: usize) -> bool {
        self.sen_index == sen_index
            && self.char_start_index <= char_index
            && char_index <= self.char_end_index
    }
}

/// Tokenize raw text into positioned tokens.
///
/// Each line becomes one sentence (1-indexed); each whitespace-separated
/// run becomes one token. Offsets are character offsets into the line's
/// rendered text (tokens joined by single spaces), so re-tokenizing the
/// rendered text reproduces identical offsets. Blank lines produce no
/// tokens but still consume a sentence index.
///
/// # Example
///
/// ```rust
/// use satya::tokenize;
///
/// let tokens = tokenize("Barack Obama\nwas born").unwrap();
/// assert_eq!(tokens.len(), 4);
/// assert_eq!(tokens[1].content, "Obama");
/// assert_eq!(tokens[1].sen_index, 1);
/// assert_eq!(tokens[1].char_start_index, 7);
/// assert_eq!(tokens[2].sen_index, 2);
/// assert_eq!(tokens[2].char_start_index, 0);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a token would be blank; the
/// whitespace splitting itself never produces one from non-empty input.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        let mut char_index = 0;
        for (word_num, word) in line.split_whitespace().enumerate() {
            let width = word.chars().count();
            let token = Token::new(
                word,
                line_num + 1,
                word_num,
                char_index,
                char_index + width,
            )?;
            char_index += width + 1;
            tokens.push(token);
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_single_line() {
        let tokens = tokenize("Barack Obama was born in 1961").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0].char_start_index, 0);
        assert_eq!(tokens[0].char_end_index, 6);
        assert_eq!(tokens[1].char_start_index, 7);
        assert_eq!(tokens[1].char_end_index, 12);
        assert_eq!(tokens[5].content, "1961");
        assert_eq!(tokens[5].char_end_index, 29);
    }

    #[test]
    fn test_sentence_indices_are_one_based() {
        let tokens = tokenize("a b\nc").unwrap();
        assert_eq!(tokens[0].sen_index, 1);
        assert_eq!(tokens[2].sen_index, 2);
        assert_eq!(tokens[2].tok_index, 0);
    }

    #[test]
    fn test_collapsed_whitespace() {
        // Runs of whitespace separate tokens without producing blanks.
        let tokens = tokenize("a   b\tc").unwrap();
        let contents: Vec<&str> = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
        // Offsets address the rendered (single-space) line.
        assert_eq!(tokens[1].char_start_index, 2);
        assert_eq!(tokens[2].char_start_index, 4);
    }

    #[test]
    fn test_blank_line_consumes_sentence_index() {
        let tokens = tokenize("a\n\nb").unwrap();
        assert_eq!(tokens[0].sen_index, 1);
        assert_eq!(tokens[1].sen_index, 3);
    }

    #[test]
    fn test_idempotent_over_rendered_text() {
        let first = tokenize("x  y\nz   w q").unwrap();
        let rendered = "x y\nz w q";
        let second = tokenize(rendered).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_derived_ids() {
        let tokens = tokenize("a b\nc").unwrap();
        assert_eq!(tokens[0].id, "1:0");
        assert_eq!(tokens[1].id, "1:1");
        assert_eq!(tokens[2].id, "2:0");
    }

    #[test]
    fn test_blank_content_rejected() {
        assert!(Token::new("   ", 1, 0, 0, 3).is_err());
    }

    #[test]
    fn test_contains_char_boundaries() {
        let token = Token::new("Obama", 1, 1, 7, 12).unwrap();
        assert!(token.contains_char(1, 7));
        assert!(token.contains_char(1, 12)); // separator resolves left
        assert!(!token.contains_char(1, 13));
        assert!(!token.contains_char(2, 7));
    }
}
