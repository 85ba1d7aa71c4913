//! BIO codec for inline slash-tagged text.
//!
//! The lightweight, text-native representation keeps labels directly in
//! the text: `Barack/B-PER Obama/I-PER`. Nesting stacks suffixes, so
//! `Obama/I-PER/I-PRES` carries two levels. Everything here is a pure
//! function over strings.
//!
//! Tag boundaries are located by the `/B-`/`/I-` marker pattern, never by
//! naively splitting on `/`, so word content containing literal slashes
//! (URLs, paths) survives intact.
//!
//! # Example
//!
//! ```rust
//! use satya::bio;
//!
//! let tagged = bio::biofy("Barack Obama", "PER").unwrap();
//! assert_eq!(tagged, "Barack/B-PER Obama/I-PER");
//! assert_eq!(bio::de_biofy(&tagged, 1), "Barack Obama");
//! ```

use crate::error::{Error, Result};

const BEGIN_MARKER: &str = "/B-";
const INSIDE_MARKER: &str = "/I-";

/// Byte position of the last `/B-` or `/I-` marker in a word, if any.
fn last_marker(word: &str) -> Option<usize> {
    match (word.rfind(BEGIN_MARKER), word.rfind(INSIDE_MARKER)) {
        (Some(b), Some(i)) => Some(b.max(i)),
        (Some(b), None) => Some(b),
        (None, Some(i)) => Some(i),
        (None, None) => None,
    }
}

/// Split a slash-tagged word into its content and its tag chain.
///
/// Tags are returned in application order (innermost first), without the
/// leading slash: `split_word_tags("c/d/e/I-x/B-y")` yields
/// `("c/d/e", ["I-x", "B-y"])`.
#[must_use]
pub fn split_word_tags(word: &str) -> (&str, Vec<&str>) {
    let mut positions = Vec::new();
    let mut end = word.len();
    while let Some(pos) = last_marker(&word[..end]) {
        positions.push(pos);
        end = pos;
    }
    positions.reverse();
    let content = &word[..positions.first().copied().unwrap_or(word.len())];
    let tags = positions
        .iter()
        .enumerate()
        .map(|(k, &pos)| {
            let seg_end = positions.get(k + 1).copied().unwrap_or(word.len());
            &word[pos + 1..seg_end]
        })
        .collect();
    (content, tags)
}

/// Number of stacked tags on a word.
#[must_use]
pub fn tag_depth(word: &str) -> usize {
    split_word_tags(word).1.len()
}

/// Maximum tag depth across every word of a (possibly multi-line) text.
#[must_use]
pub fn max_tag_depth(text: &str) -> usize {
    text.lines()
        .flat_map(str::split_whitespace)
        .map(tag_depth)
        .max()
        .unwrap_or(0)
}

/// Label a run of words: `/B-<label>` on the first, `/I-<label>` on the
/// rest.
///
/// # Errors
///
/// [`Error::InvalidInput`] when the text is empty or contains a blank
/// token (consecutive spaces).
pub fn biofy(text: &str, label: &str) -> Result<String> {
    let words: Vec<&str> = text.split(' ').collect();
    if words.iter().any(|w| w.is_empty()) {
        return Err(Error::invalid_input(format!(
            "cannot label text with blank tokens: {text:?}"
        )));
    }
    let tagged: Vec<String> = words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let marker = if i == 0 { BEGIN_MARKER } else { INSIDE_MARKER };
            format!("{word}{marker}{label}")
        })
        .collect();
    Ok(tagged.join(" "))
}

/// Strip `depth` levels of labels from a line.
///
/// Each pass removes exactly one trailing `/B-…` or `/I-…` suffix from
/// every word currently at the maximum tag depth found across the line;
/// shallower words are untouched on that pass. `depth = 0` is a no-op,
/// and `depth` ≥ the actual maximum fully strips the line. Structural
/// inverse of [`biofy`]: `de_biofy(&biofy(text, label)?, 1) == text`.
#[must_use]
pub fn de_biofy(text: &str, depth: usize) -> String {
    let mut words: Vec<String> = text.split(' ').map(String::from).collect();
    for _ in 0..depth {
        let max = words.iter().map(|w| tag_depth(w)).max().unwrap_or(0);
        if max == 0 {
            break;
        }
        for word in &mut words {
            if tag_depth(word) == max {
                if let Some(pos) = last_marker(word) {
                    word.truncate(pos);
                }
            }
        }
    }
    words.join(" ")
}

/// Whether a selection is exactly one fully-labeled span.
///
/// True iff every word's outermost tag names one common label from
/// `labels`, the first word carries a `B-` marker, the rest carry `I-`
/// markers of that label, and — when `following_text` is non-empty — its
/// first word does not continue the span with another `I-` marker.
#[must_use]
pub fn is_labeled<S: AsRef<str>>(text: &str, labels: &[S], following_text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    let Some(first) = words.first() else {
        return false;
    };
    let (_, first_tags) = split_word_tags(first);
    let Some(label) = first_tags.last().and_then(|t| t.strip_prefix("B-")) else {
        return false;
    };
    if !labels.iter().any(|l| l.as_ref() == label) {
        return false;
    }
    let continuation = format!("I-{label}");
    for word in &words[1..] {
        let (_, tags) = split_word_tags(word);
        if tags.last().copied() != Some(continuation.as_str()) {
            return false;
        }
    }
    if let Some(next) = following_text.split_whitespace().next() {
        let (_, tags) = split_word_tags(next);
        if tags.last().copied() == Some(continuation.as_str()) {
            return false;
        }
    }
    true
}

/// Words of a line with their character positions in it.
///
/// Returns `(char_start, char_len, word)` per single-space-separated
/// word. Positions are character (not byte) offsets.
fn words_with_positions(line: &str) -> Vec<(usize, usize, &str)> {
    let mut out = Vec::new();
    let mut pos = 0;
    for word in line.split(' ') {
        let len = word.chars().count();
        out.push((pos, len, word));
        pos += len + 1;
    }
    out
}

/// Locate the minimal fully-labeled word run around a cursor position.
///
/// The word containing `char_index` is resolved first (a space resolves
/// to the word on its left). From an `I-` word the scan walks left to the
/// `B-` word opening the span, then right across the `I-` continuation.
/// Returns the inclusive character bounds of the run.
///
/// Returns `Ok(None)` when the index points past the line end, no word is
/// found, the resolved word is untagged, or no `B-` start exists to the
/// left of an `I-` continuation.
///
/// # Errors
///
/// [`Error::AmbiguousNesting`] when any word of the line stacks more than
/// one tag; a single nesting level is required to resolve a cursor.
///
/// # Example
///
/// ```rust
/// use satya::bio::closest_labeled_span;
///
/// let line = "barack/B-PER obama/I-PER was born in Hawaii/B-LOC in 1961/B-DATE";
/// assert_eq!(closest_labeled_span(line, 5).unwrap(), Some((0, 23)));
/// assert_eq!(closest_labeled_span(line, 27).unwrap(), None);
/// ```
pub fn closest_labeled_span(line: &str, char_index: usize) -> Result<Option<(usize, usize)>> {
    if line
        .split_whitespace()
        .any(|word| tag_depth(word) > 1)
    {
        return Err(Error::ambiguous_nesting(
            "line stacks more than one tag level, cannot resolve a single span",
        ));
    }
    let line_width = line.chars().count();
    if char_index >= line_width {
        return Ok(None);
    }
    let words = words_with_positions(line);
    let Some(hit) = words
        .iter()
        .position(|&(start, len, _)| start <= char_index && char_index <= start + len)
    else {
        return Ok(None);
    };

    let (_, tags) = split_word_tags(words[hit].2);
    let Some(tag) = tags.first() else {
        return Ok(None); // untagged word under the cursor
    };
    let Some((prefix, label)) = tag.split_once('-') else {
        return Ok(None);
    };

    let begin = format!("B-{label}");
    let inside = format!("I-{label}");

    let start = if prefix == "B" {
        hit
    } else {
        // Walk left through the continuation to the opening B- word.
        let mut found = None;
        for j in (0..hit).rev() {
            let (_, tags) = split_word_tags(words[j].2);
            match tags.first() {
                Some(t) if *t == begin => {
                    found = Some(j);
                    break;
                }
                Some(t) if *t == inside => continue,
                _ => break,
            }
        }
        match found {
            Some(j) => j,
            None => return Ok(None),
        }
    };

    let mut last = hit;
    for (k, &(_, _, word)) in words.iter().enumerate().skip(hit + 1) {
        let (_, tags) = split_word_tags(word);
        if tags.first().copied() == Some(inside.as_str()) {
            last = k;
        } else {
            break;
        }
    }

    let (run_start, _, _) = words[start];
    let (last_start, last_len, _) = words[last];
    Ok(Some((run_start, last_start + last_len - 1)))
}

/// Expand a raw character selection to whole-word boundaries.
///
/// `start` moves left to the beginning of its word; `end` (exclusive)
/// moves right to the next separator or the line end. Out-of-range
/// bounds are clamped to the line.
#[must_use]
pub fn snap_selection(line: &str, start: usize, end: usize) -> (usize, usize) {
    let chars: Vec<char> = line.chars().collect();
    let mut start = start.min(chars.len());
    let mut end = end.min(chars.len());
    while start > 0 && chars[start - 1] != ' ' {
        start -= 1;
    }
    while end < chars.len() && chars[end] != ' ' {
        end += 1;
    }
    (start, end)
}

/// Convert one slash-tagged sentence into BIO rows.
///
/// One row per whitespace-separated word: the word content plus
/// `num_columns` tag columns, right-padded with `O`. Words with no tag
/// become `O` in every column.
///
/// # Example
///
/// ```rust
/// use satya::bio::sentence_columns;
///
/// let rows = sentence_columns("Barack/B-PER Obama/I-PER won", 1);
/// assert_eq!(rows[0], ("Barack".to_string(), vec!["B-PER".to_string()]));
/// assert_eq!(rows[2], ("won".to_string(), vec!["O".to_string()]));
/// ```
#[must_use]
pub fn sentence_columns(line: &str, num_columns: usize) -> Vec<(String, Vec<String>)> {
    line.split_whitespace()
        .map(|word| {
            let (content, tags) = split_word_tags(word);
            let columns = (0..num_columns)
                .map(|c| tags.get(c).map_or_else(|| "O".to_string(), |t| (*t).to_string()))
                .collect();
            (content.to_string(), columns)
        })
        .collect()
}

/// Convert multi-line slash-tagged text into columnar BIO/CONLL text.
///
/// The column count defaults to the maximum tag depth observed across the
/// whole input (at least one). A blank line follows each sentence; blank
/// input lines are skipped.
#[must_use]
pub fn to_conll(text: &str, num_columns: Option<usize>) -> String {
    let width = num_columns.unwrap_or_else(|| max_tag_depth(text)).max(1);
    let mut out = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        for (content, columns) in sentence_columns(line, width) {
            out.push_str(&content);
            for column in &columns {
                out.push(' ');
                out.push_str(column);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
