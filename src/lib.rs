//! # satya
//!
//! Span annotation core.
//!
//! - **Data model**: tokens, spans, hierarchical tags, and typed
//!   relations, with the invariants that keep them consistent under
//!   labeling and un-labeling
//! - **BIO codec**: bidirectional conversion between inline slash-tagged
//!   text (`word/B-TAG word/I-TAG`) and columnar BIO/CONLL output
//! - **History**: bounded undo stack of whole-document snapshots
//! - **Schema**: entity/relation configuration with startup validation
//!
//! The crate is the widget-free core of a span annotation tool: rendering,
//! key bindings, dialogs, and color assignment live in a consuming UI
//! layer that calls in through [`Document`], [`bio`], and [`ingest`].
//!
//! ## Quick Start
//!
//! ```rust
//! use satya::{Document, Tag};
//!
//! let mut doc = Document::from_text("Barack Obama was born in 1961").unwrap();
//!
//! // Label "Barack Obama" as PER by character range.
//! let span_id = doc.add_entity(Tag::new("PER"), 1, 0, 12).unwrap();
//! assert_eq!(doc.span_by_id(&span_id).unwrap().content, "Barack Obama");
//!
//! // Tokens mirror span membership in BIO form.
//! assert_eq!(doc.tokens()[0].tags, ["B-PER"]);
//! assert_eq!(doc.tokens()[1].tags, ["I-PER"]);
//! ```
//!
//! ## Inline slash-tagged text
//!
//! The lightweight, text-native variant of the tool keeps labels inline
//! and persists the raw text verbatim:
//!
//! ```rust
//! use satya::bio;
//!
//! let tagged = bio::biofy("Barack Obama", "PER").unwrap();
//! assert_eq!(tagged, "Barack/B-PER Obama/I-PER");
//!
//! let rows = bio::sentence_columns(&tagged, 1);
//! assert_eq!(rows[0].1, ["B-PER"]);
//! ```
//!
//! ## Design Philosophy
//!
//! - **One model, relations optional**: the relation subsystem layers on
//!   the same span/tag core instead of forking a second document type
//! - **Expected outcomes are values**: "no selection" and "no match" are
//!   `Result`/`Option` outcomes, not panics
//! - **All-or-nothing mutation**: precondition checks run before any
//!   state changes, so a rejected operation leaves the document untouched
//! - **Document state only**: the core never holds UI state; file names
//!   and cursor positions are passed in and returned explicitly

#![warn(missing_docs)]

pub mod bio;
mod document;
mod error;
mod history;
pub mod ingest;
mod schema;
mod token;

pub use document::{Document, Relation, Span, Tag, DEFAULT_TAG_COLOR};
pub use error::{Error, Result};
pub use history::{DocumentSnapshot, History};
pub use ingest::FileKind;
pub use schema::{EntityDef, RelationDef, RelationEnds, Schema, RESERVED_SHORTCUTS};
pub use token::{tokenize, Token};

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use satya::prelude::*;
    //!
    //! let doc = Document::from_text("hello world").unwrap();
    //! assert_eq!(doc.tokens().len(), 2);
    //! ```
    pub use crate::bio;
    pub use crate::document::{Document, Relation, Span, Tag};
    pub use crate::error::{Error, Result};
    pub use crate::history::{DocumentSnapshot, History};
    pub use crate::ingest::{self, FileKind};
    pub use crate::schema::Schema;
    pub use crate::token::{tokenize, Token};
}
