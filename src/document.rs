//! The annotation document: spans, tags, relations, and the invariants
//! that keep them consistent.
//!
//! [`Document`] is the aggregate root. It owns the ordered token stream,
//! the spans keyed by their derived id, the relation set, and the
//! token↔span membership table. Every mutating operation checks its
//! preconditions before touching any state, so a rejected operation
//! leaves the document exactly as it was.
//!
//! # Tag levels
//!
//! Tags carry an integer `level` (≥ 1) ranking nested labels: a higher
//! level may wrap a lower-level span, never the reverse. The dominance
//! rule is enforced in both directions when labels are added, so it holds
//! regardless of the order the user applied them in.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::{tokenize, Token};

/// Default display color for tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "yellow";

fn default_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

fn default_level() -> u32 {
    1
}

/// An entity label carried by a span.
///
/// `color` is a display hint for the consuming UI; it plays no role in
/// the core logic beyond serialization. `level` ranks nested labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Label name (e.g. `PER`).
    pub content: String,
    /// Display color hint.
    #[serde(default = "default_color")]
    pub color: String,
    /// Hierarchy rank, ≥ 1. Defaults to 1 when absent from input.
    #[serde(default = "default_level")]
    pub level: u32,
}

impl Tag {
    /// Create a tag with the default color and level 1.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            color: default_color(),
            level: default_level(),
        }
    }

    /// Set the display color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the hierarchy level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// A maximal contiguous run of tokens within one sentence, carrying one
/// or more tags.
///
/// A span's identity derives purely from its `(sentence, token-range)`
/// triple; its existence is emergent from a non-empty tag set. Deleting
/// the last tag deletes the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based sentence index.
    pub sen_index: usize,
    /// First member token index (inclusive).
    pub tok_start_index: usize,
    /// Last member token index (inclusive).
    pub tok_end_index: usize,
    /// Space-joined member token text.
    pub content: String,
    /// Character offset of the first member token's first character.
    pub char_start_index: usize,
    /// Character offset one past the last member token's last character.
    pub char_end_index: usize,
    /// Span identifier, `sen:tokStart:tokEnd` unless supplied.
    #[serde(default)]
    pub id: String,
    /// Tags, ordered by application, unique by content.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Span {
    /// Build an untagged span over a token run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the run is empty, crosses
    /// sentences, or is not consecutive.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self> {
        let first = tokens
            .first()
            .ok_or_else(|| Error::invalid_input("a span needs at least one token"))?;
        let last = &tokens[tokens.len() - 1];
        for pair in tokens.windows(2) {
            if pair[1].sen_index != pair[0].sen_index {
                return Err(Error::invalid_input(
                    "span tokens must come from the same sentence",
                ));
            }
            if pair[1].tok_index != pair[0].tok_index + 1 {
                return Err(Error::invalid_input("span tokens must be consecutive"));
            }
        }
        let content = tokens
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Self {
            sen_index: first.sen_index,
            tok_start_index: first.tok_index,
            tok_end_index: last.tok_index,
            content,
            char_start_index: first.char_start_index,
            char_end_index: last.char_end_index,
            id: Self::derived_id(first.sen_index, first.tok_index, last.tok_index),
            tags: Vec::new(),
        })
    }

    /// The canonical id for a `(sentence, token-range)` triple.
    #[must_use]
    pub fn derived_id(sen_index: usize, tok_start_index: usize, tok_end_index: usize) -> String {
        format!("{sen_index}:{tok_start_index}:{tok_end_index}")
    }

    /// Fill in the derived id when a deserialized span arrived without one.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Self::derived_id(self.sen_index, self.tok_start_index, self.tok_end_index);
        }
    }

    /// Add a tag, deduplicating by content. Returns false when the span
    /// already carried a tag with that content.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if self.has_tag(&tag.content) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove the tag with the given content, returning it.
    pub fn remove_tag(&mut self, content: &str) -> Option<Tag> {
        let pos = self.tags.iter().position(|t| t.content == content)?;
        Some(self.tags.remove(pos))
    }

    /// Whether the span carries a tag with the given content.
    #[must_use]
    pub fn has_tag(&self, content: &str) -> bool {
        self.tags.iter().any(|t| t.content == content)
    }

    /// Maximum level among the span's tags; 0 when untagged.
    #[must_use]
    pub fn max_tag_level(&self) -> u32 {
        self.tags.iter().map(|t| t.level).max().unwrap_or(0)
    }
}

/// A directed, typed edge between two spans, unique by the full triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Source span id.
    pub start_id: String,
    /// Target span id.
    pub end_id: String,
    /// Relation type name.
    pub name: String,
}

impl Relation {
    /// Create a relation triple.
    #[must_use]
    pub fn new(
        start_id: impl Into<String>,
        end_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            start_id: start_id.into(),
            end_id: end_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[{}]->{}", self.start_id, self.name, self.end_id)
    }
}

/// Wire form of a document: plain lists, as produced and consumed by the
/// JSON document format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    tokens: Vec<Token>,
    #[serde(default)]
    spans: Vec<Span>,
    #[serde(default)]
    relations: Vec<Relation>,
    #[serde(default)]
    tokens_spans: Vec<(String, String)>,
}

impl From<&Document> for DocumentRecord {
    fn from(doc: &Document) -> Self {
        Self {
            tokens: doc.tokens.clone(),
            spans: doc.spans.values().cloned().collect(),
            relations: doc.relations.iter().cloned().collect(),
            tokens_spans: doc.tokens_spans.clone(),
        }
    }
}

impl TryFrom<DocumentRecord> for Document {
    type Error = Error;

    fn try_from(record: DocumentRecord) -> Result<Self> {
        let mut tokens = record.tokens;
        for token in &mut tokens {
            if token.content.trim().is_empty() {
                return Err(Error::parse(format!(
                    "blank token content at {}:{}",
                    token.sen_index, token.tok_index
                )));
            }
            token.ensure_id();
        }
        let mut spans = IndexMap::with_capacity(record.spans.len());
        for mut span in record.spans {
            span.ensure_id();
            let id = span.id.clone();
            if spans.insert(id.clone(), span).is_some() {
                return Err(Error::parse(format!("duplicate span id {id}")));
            }
        }
        let relations: IndexSet<Relation> = record.relations.into_iter().collect();
        Ok(Self {
            tokens,
            spans,
            relations,
            tokens_spans: record.tokens_spans,
        })
    }
}

/// The full text being annotated, with its spans, relations, and
/// token↔span membership.
///
/// # Example
///
/// ```rust
/// use satya::{Document, Tag};
///
/// let mut doc = Document::from_text("Barack Obama was born in 1961").unwrap();
/// doc.add_entity(Tag::new("PER"), 1, 0, 12).unwrap();
/// doc.add_entity(Tag::new("DATE"), 1, 25, 29).unwrap();
///
/// assert_eq!(
///     doc.to_conll(None),
///     "Barack B-PER\nObama I-PER\nwas O\nborn O\nin O\n1961 B-DATE\n\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Document {
    tokens: Vec<Token>,
    spans: IndexMap<String, Span>,
    relations: IndexSet<Relation>,
    tokens_spans: Vec<(String, String)>,
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DocumentRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let record = DocumentRecord::deserialize(deserializer)?;
        Document::try_from(record).map_err(serde::de::Error::custom)
    }
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from plain text (one sentence per line).
    ///
    /// # Errors
    ///
    /// Propagates tokenization failures.
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(text)?,
            ..Self::default()
        })
    }

    /// Build a document from its JSON serialization.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let record: DocumentRecord = serde_json::from_str(json)?;
        Self::try_from(record)
    }

    /// Build a document from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let record: DocumentRecord = serde_json::from_value(value)?;
        Self::try_from(record)
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The ordered token stream.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// All spans, in creation order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.spans.values()
    }

    /// All relations, in creation order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// The token↔span membership rows.
    #[must_use]
    pub fn tokens_spans(&self) -> &[(String, String)] {
        &self.tokens_spans
    }

    // =========================================================================
    // Labeling
    // =========================================================================

    /// Apply a tag over the tokens of `sen_index` whose character ranges
    /// fall inside `[char_start_index, char_end_index]`.
    ///
    /// Merges into the span with the exact same token range when one
    /// exists, otherwise creates a new span. Member tokens get `B-`/`I-`
    /// entries for the tag. Returns the span id.
    ///
    /// # Errors
    ///
    /// - [`Error::NoTokenSelected`] when the range matches no tokens.
    /// - [`Error::TagLevelHierarchy`] when the tag's level is outranked by
    ///   the span's existing tags, by a span nested inside the range, or
    ///   when it outranks a span enclosing the range.
    ///
    /// On error the document is unchanged.
    pub fn add_entity(
        &mut self,
        tag: Tag,
        sen_index: usize,
        char_start_index: usize,
        char_end_index: usize,
    ) -> Result<String> {
        let mut selected: Vec<usize> = (0..self.tokens.len())
            .filter(|&i| {
                let t = &self.tokens[i];
                t.sen_index == sen_index
                    && t.char_start_index >= char_start_index
                    && t.char_end_index <= char_end_index
            })
            .collect();
        if selected.is_empty() {
            return Err(Error::no_token_selected(format!(
                "no token inside sentence {sen_index} range [{char_start_index}, {char_end_index}]"
            )));
        }
        selected.sort_by_key(|&i| self.tokens[i].tok_index);

        let (first, last) = (&self.tokens[selected[0]], &self.tokens[selected[selected.len() - 1]]);
        let span_id = Span::derived_id(sen_index, first.tok_index, last.tok_index);
        let (span_start, span_end) = (first.char_start_index, last.char_end_index);

        let merge = if let Some(span) = self.spans.get(&span_id) {
            if span.has_tag(&tag.content) {
                log::debug!("span {span_id} already carries tag {}", tag.content);
                return Ok(span_id);
            }
            if span.max_tag_level() > tag.level {
                return Err(Error::tag_level_hierarchy(format!(
                    "span {span_id} carries a level {} tag, refusing level {} tag {}",
                    span.max_tag_level(),
                    tag.level,
                    tag.content
                )));
            }
            true
        } else {
            false
        };

        if merge {
            self.append_token_tags(&selected, &tag.content);
            if let Some(span) = self.spans.get_mut(&span_id) {
                span.add_tag(tag);
            }
            return Ok(span_id);
        }

        // New span: levels must dominate everything nested inside the
        // range and must not outrank anything enclosing it.
        let nested_max = self
            .spans
            .values()
            .filter(|s| {
                s.sen_index == sen_index
                    && s.char_start_index >= span_start
                    && s.char_end_index <= span_end
            })
            .map(Span::max_tag_level)
            .max()
            .unwrap_or(0);
        if nested_max > tag.level {
            return Err(Error::tag_level_hierarchy(format!(
                "range wraps a level {nested_max} span, refusing level {} tag {}",
                tag.level, tag.content
            )));
        }
        let enclosing_min = self
            .spans
            .values()
            .filter(|s| {
                s.sen_index == sen_index
                    && s.char_start_index <= span_start
                    && s.char_end_index >= span_end
            })
            .map(Span::max_tag_level)
            .min();
        if let Some(enclosing_min) = enclosing_min {
            if tag.level > enclosing_min {
                return Err(Error::tag_level_hierarchy(format!(
                    "range sits inside a level {enclosing_min} span, refusing level {} tag {}",
                    tag.level, tag.content
                )));
            }
        }

        let members: Vec<Token> = selected.iter().map(|&i| self.tokens[i].clone()).collect();
        let mut span = Span::from_tokens(&members)?;
        let tag_content = tag.content.clone();
        span.add_tag(tag);
        for token in &members {
            self.tokens_spans.push((token.id.clone(), span.id.clone()));
        }
        self.append_token_tags(&selected, &tag_content);
        let id = span.id.clone();
        self.spans.insert(id.clone(), span);
        log::debug!("created span {id} with tag {tag_content}");
        Ok(id)
    }

    /// Remove a tag from a span.
    ///
    /// Member tokens lose the matching `B-`/`I-` entry. When the span is
    /// left without tags it is deleted together with its membership rows,
    /// and every relation referencing it is cascaded away.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when the span id is unknown or the span
    /// does not carry the tag; the document is unchanged.
    pub fn delete_entity(&mut self, span_id: &str, tag_content: &str) -> Result<()> {
        let carries = self
            .spans
            .get(span_id)
            .ok_or_else(|| Error::invalid_input(format!("no span with id {span_id}")))?
            .has_tag(tag_content);
        if !carries {
            return Err(Error::invalid_input(format!(
                "span {span_id} does not carry tag {tag_content}"
            )));
        }

        if let Some(span) = self.spans.get_mut(span_id) {
            span.remove_tag(tag_content);
        }

        let member_ids: Vec<String> = self
            .tokens_spans
            .iter()
            .filter(|(_, s)| s.as_str() == span_id)
            .map(|(t, _)| t.clone())
            .collect();
        let begin = format!("B-{tag_content}");
        let inside = format!("I-{tag_content}");
        for token_id in &member_ids {
            if let Some(token) = self.token_by_id_mut(token_id) {
                if let Some(pos) = token.tags.iter().position(|t| t == &begin) {
                    token.tags.remove(pos);
                } else if let Some(pos) = token.tags.iter().position(|t| t == &inside) {
                    token.tags.remove(pos);
                }
            }
        }

        let now_empty = self.spans.get(span_id).is_some_and(|s| s.tags.is_empty());
        if now_empty {
            self.spans.shift_remove(span_id);
            self.tokens_spans.retain(|(_, s)| s.as_str() != span_id);
            let removed = self.delete_relations_by_span(span_id);
            if removed > 0 {
                log::debug!("cascaded {removed} relation(s) off span {span_id}");
            }
        }
        Ok(())
    }

    fn append_token_tags(&mut self, selected: &[usize], tag_content: &str) {
        for (pos, &idx) in selected.iter().enumerate() {
            let prefix = if pos == 0 { 'B' } else { 'I' };
            self.tokens[idx].tags.push(format!("{prefix}-{tag_content}"));
        }
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Add a directed relation between two existing spans.
    ///
    /// Relations are unique by the `(start, end, name)` triple; re-adding
    /// an existing one is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when either span id is unknown.
    pub fn add_relation(&mut self, start_id: &str, end_id: &str, name: &str) -> Result<()> {
        if !self.spans.contains_key(start_id) {
            return Err(Error::invalid_input(format!("no span with id {start_id}")));
        }
        if !self.spans.contains_key(end_id) {
            return Err(Error::invalid_input(format!("no span with id {end_id}")));
        }
        self.relations.insert(Relation::new(start_id, end_id, name));
        Ok(())
    }

    /// Delete the relation matching the exact triple.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when no such relation exists.
    pub fn delete_relation(&mut self, start_id: &str, end_id: &str, name: &str) -> Result<()> {
        let relation = Relation::new(start_id, end_id, name);
        if self.relations.shift_remove(&relation) {
            Ok(())
        } else {
            Err(Error::invalid_input(format!("no relation {relation}")))
        }
    }

    /// Delete every relation referencing the span on either side.
    /// Returns how many were removed.
    pub fn delete_relations_by_span(&mut self, span_id: &str) -> usize {
        let before = self.relations.len();
        self.relations
            .retain(|r| r.start_id != span_id && r.end_id != span_id);
        before - self.relations.len()
    }

    /// All relations referencing the span on either side.
    #[must_use]
    pub fn relations_by_span_id(&self, span_id: &str) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.start_id == span_id || r.end_id == span_id)
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Token by id.
    #[must_use]
    pub fn token_by_id(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    fn token_by_id_mut(&mut self, id: &str) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    /// Span by id.
    #[must_use]
    pub fn span_by_id(&self, id: &str) -> Option<&Span> {
        self.spans.get(id)
    }

    /// Id of the span matching the exact character range, if any.
    #[must_use]
    pub fn span_id_by_char_range(
        &self,
        sen_index: usize,
        char_start_index: usize,
        char_end_index: usize,
    ) -> Option<String> {
        self.spans
            .values()
            .find(|s| {
                s.sen_index == sen_index
                    && s.char_start_index == char_start_index
                    && s.char_end_index == char_end_index
            })
            .map(|s| s.id.clone())
    }

    /// Id of the first token whose range contains the cursor position.
    #[must_use]
    pub fn token_id_by_char_position(&self, sen_index: usize, char_index: usize) -> Option<String> {
        self.tokens
            .iter()
            .find(|t| t.contains_char(sen_index, char_index))
            .map(|t| t.id.clone())
    }

    /// Ids of every span a token belongs to. A token maps to more than
    /// one span when ranges were relabeled across nesting levels.
    #[must_use]
    pub fn span_ids_by_token_id(&self, token_id: &str) -> Vec<String> {
        let mut ids = Vec::new();
        for (t, s) in &self.tokens_spans {
            if t.as_str() == token_id && !ids.iter().any(|known: &String| known == s) {
                ids.push(s.clone());
            }
        }
        ids
    }

    /// Ids of every span covering the cursor position.
    #[must_use]
    pub fn span_ids_by_char_position(&self, sen_index: usize, char_index: usize) -> Vec<String> {
        match self.token_id_by_char_position(sen_index, char_index) {
            Some(token_id) => self.span_ids_by_token_id(&token_id),
            None => Vec::new(),
        }
    }

    /// Whether the membership table links the token to the span.
    #[must_use]
    pub fn is_token_in_span(&self, token_id: &str, span_id: &str) -> bool {
        self.tokens_spans
            .iter()
            .any(|(t, s)| t.as_str() == token_id && s.as_str() == span_id)
    }

    // =========================================================================
    // Derivations
    // =========================================================================

    /// The rendered display text: tokens joined by single spaces,
    /// sentences joined by newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut current = None;
        for token in &self.tokens {
            match current {
                Some(sen) if sen == token.sen_index => out.push(' '),
                Some(_) => out.push('\n'),
                None => {}
            }
            out.push_str(&token.content);
            current = Some(token.sen_index);
        }
        out
    }

    /// Render the document as columnar BIO/CONLL text.
    ///
    /// One line per token, `<word> <tag_1> … <tag_N>`; a blank line
    /// follows each sentence. The column count defaults to the maximum
    /// per-token tag count across the document (at least one); missing
    /// columns are padded with `O`.
    #[must_use]
    pub fn to_conll(&self, num_columns: Option<usize>) -> String {
        let width = num_columns
            .unwrap_or_else(|| self.tokens.iter().map(|t| t.tags.len()).max().unwrap_or(0))
            .max(1);
        let mut out = String::new();
        let mut current = None;
        for token in &self.tokens {
            if let Some(sen) = current {
                if sen != token.sen_index {
                    out.push('\n');
                }
            }
            current = Some(token.sen_index);
            out.push_str(&token.content);
            for col in 0..width {
                out.push(' ');
                out.push_str(token.tags.get(col).map_or("O", String::as_str));
            }
            out.push('\n');
        }
        if current.is_some() {
            out.push('\n');
        }
        out
    }

    /// Parse columnar BIO/CONLL text back into a document.
    ///
    /// Blank lines separate sentences. Per column, `B-X` starts a span
    /// and `I-X` continues it (an orphan `I-X` leniently starts one);
    /// column *c* maps to tag level *c + 1*, since the wire format does
    /// not carry levels.
    ///
    /// # Errors
    ///
    /// Propagates token construction failures on malformed rows.
    pub fn from_conll(text: &str) -> Result<Self> {
        let mut doc = Document::default();
        let mut sen_index = 0usize;
        let mut rows: Vec<(String, Vec<String>)> = Vec::new();
        for line in text.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !rows.is_empty() {
                    sen_index += 1;
                    doc.push_conll_sentence(sen_index, &rows)?;
                    rows.clear();
                }
                continue;
            }
            let mut parts = line.split_whitespace();
            let word = parts
                .next()
                .ok_or_else(|| Error::parse("empty CONLL row"))?;
            rows.push((word.to_string(), parts.map(String::from).collect()));
        }
        Ok(doc)
    }

    fn push_conll_sentence(
        &mut self,
        sen_index: usize,
        rows: &[(String, Vec<String>)],
    ) -> Result<()> {
        let base = self.tokens.len();
        let mut char_index = 0;
        for (tok_index, (word, tags)) in rows.iter().enumerate() {
            let width = word.chars().count();
            let mut token = Token::new(
                word.clone(),
                sen_index,
                tok_index,
                char_index,
                char_index + width,
            )?;
            token.tags = tags.iter().filter(|t| t.as_str() != "O").cloned().collect();
            char_index += width + 1;
            self.tokens.push(token);
        }

        let columns = rows.iter().map(|(_, tags)| tags.len()).max().unwrap_or(0);
        for col in 0..columns {
            let mut run: Option<(usize, String)> = None;
            for row in 0..=rows.len() {
                let tag = if row < rows.len() {
                    rows[row].1.get(col).map_or("O", String::as_str)
                } else {
                    "O"
                };
                let (prefix, label) = match tag.split_once('-') {
                    Some((p, l)) if p == "B" || p == "I" => (p, l),
                    _ => ("O", ""),
                };
                let continues =
                    prefix == "I" && run.as_ref().is_some_and(|(_, l)| l.as_str() == label);
                if continues {
                    continue;
                }
                if let Some((start_row, run_label)) = run.take() {
                    self.insert_conll_span(base, start_row, row - 1, &run_label, col)?;
                }
                if prefix == "B" || prefix == "I" {
                    run = Some((row, label.to_string()));
                }
            }
        }
        Ok(())
    }

    fn insert_conll_span(
        &mut self,
        base: usize,
        start_row: usize,
        end_row: usize,
        label: &str,
        col: usize,
    ) -> Result<()> {
        let members: Vec<Token> = self.tokens[base + start_row..=base + end_row].to_vec();
        let tag = Tag::new(label).with_level(col as u32 + 1);
        let first = &members[0];
        let id = Span::derived_id(
            first.sen_index,
            first.tok_index,
            members[members.len() - 1].tok_index,
        );
        if let Some(existing) = self.spans.get_mut(&id) {
            existing.add_tag(tag);
            return Ok(());
        }
        let mut span = Span::from_tokens(&members)?;
        span.add_tag(tag);
        for token in &members {
            self.tokens_spans.push((token.id.clone(), span.id.clone()));
        }
        self.spans.insert(id, span);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_from_tokens_rejects_gaps() {
        let tokens = tokenize("a b c").unwrap();
        let gappy = [tokens[0].clone(), tokens[2].clone()];
        assert!(Span::from_tokens(&gappy).is_err());
        assert!(Span::from_tokens(&tokens[..2]).is_ok());
        assert!(Span::from_tokens(&[]).is_err());
    }

    #[test]
    fn test_span_from_tokens_rejects_cross_sentence() {
        let tokens = tokenize("a\nb").unwrap();
        assert!(Span::from_tokens(&tokens).is_err());
    }

    #[test]
    fn test_span_tag_dedup() {
        let tokens = tokenize("a b").unwrap();
        let mut span = Span::from_tokens(&tokens).unwrap();
        assert!(span.add_tag(Tag::new("PER")));
        assert!(!span.add_tag(Tag::new("PER")));
        assert_eq!(span.tags.len(), 1);
    }

    #[test]
    fn test_span_max_tag_level() {
        let tokens = tokenize("a").unwrap();
        let mut span = Span::from_tokens(&tokens).unwrap();
        assert_eq!(span.max_tag_level(), 0);
        span.add_tag(Tag::new("X").with_level(2));
        span.add_tag(Tag::new("Y"));
        assert_eq!(span.max_tag_level(), 2);
    }

    #[test]
    fn test_to_text_roundtrip() {
        let doc = Document::from_text("a b\nc d e").unwrap();
        assert_eq!(doc.to_text(), "a b\nc d e");
    }

    #[test]
    fn test_relation_display() {
        let relation = Relation::new("1:0:1", "1:3:4", "born_in");
        assert_eq!(relation.to_string(), "1:0:1-[born_in]->1:3:4");
    }

    #[test]
    fn test_token_id_by_char_position_picks_first_cover() {
        let doc = Document::from_text("ab cd").unwrap();
        // The separator position resolves to the token on its left.
        assert_eq!(doc.token_id_by_char_position(1, 2).as_deref(), Some("1:0"));
        assert_eq!(doc.token_id_by_char_position(1, 3).as_deref(), Some("1:1"));
        assert_eq!(doc.token_id_by_char_position(1, 9), None);
    }

    #[test]
    fn test_tag_defaults_parse_from_minimal_json() {
        let tag: Tag = serde_json::from_str(r#"{"content": "PER"}"#).unwrap();
        assert_eq!(tag.color, DEFAULT_TAG_COLOR);
        assert_eq!(tag.level, 1);
    }
}
