//! BIO codec tests over the inline slash-tagged representation.

use satya::bio::{
    biofy, closest_labeled_span, de_biofy, is_labeled, max_tag_depth, sentence_columns, to_conll,
};
use satya::Error;

fn row(word: &str, tags: &[&str]) -> (String, Vec<String>) {
    (
        word.to_string(),
        tags.iter().map(|t| (*t).to_string()).collect(),
    )
}

// =============================================================================
// biofy / de_biofy
// =============================================================================

#[test]
fn biofy_marks_begin_and_inside() {
    assert_eq!(
        biofy("Barack Obama", "PER").unwrap(),
        "Barack/B-PER Obama/I-PER"
    );
    assert_eq!(biofy("Hawaii", "LOC").unwrap(), "Hawaii/B-LOC");
}

#[test]
fn de_biofy_strips_deepest_words_first() {
    let content = "x/B-PER y/I-PER/B-LOC z/I-PER/I-LOC/B-ORG";
    assert_eq!(de_biofy(content, 1), "x/B-PER y/I-PER/B-LOC z/I-PER/I-LOC");
    assert_eq!(de_biofy(content, 2), "x/B-PER y/I-PER z/I-PER");
    assert_eq!(de_biofy(content, 3), "x y z");
}

#[test]
fn de_biofy_keeps_slashes_in_word_content() {
    let content = "www.abc.com/some_page/B-PER www.abc.com/some_page/another/I-PER/B-LOC \
                   www.abc.com/some_page/another/another/I-PER/I-LOC/B-ORG";
    assert_eq!(
        de_biofy(content, 1),
        "www.abc.com/some_page/B-PER www.abc.com/some_page/another/I-PER/B-LOC \
         www.abc.com/some_page/another/another/I-PER/I-LOC"
    );
    assert_eq!(
        de_biofy(content, 2),
        "www.abc.com/some_page/B-PER www.abc.com/some_page/another/I-PER \
         www.abc.com/some_page/another/another/I-PER"
    );
    assert_eq!(
        de_biofy(content, 3),
        "www.abc.com/some_page www.abc.com/some_page/another \
         www.abc.com/some_page/another/another"
    );
}

#[test]
fn biofy_then_de_biofy_is_identity() {
    let text = "was born in Hawaii";
    let tagged = biofy(text, "EVT").unwrap();
    assert_eq!(de_biofy(&tagged, 1), text);
}

// =============================================================================
// is_labeled
// =============================================================================

#[test]
fn is_labeled_accepts_a_single_complete_chain() {
    let labels = ["PER", "ORG"];
    assert!(is_labeled("Barack/B-PER Obama/I-PER", &labels, ""));
}

#[test]
fn is_labeled_rejects_untagged_and_broken_chains() {
    let labels = ["PER", "ORG"];
    // First word untagged.
    assert!(!is_labeled("www.something/com Ford/I-ORG", &labels, ""));
    // No B- start.
    assert!(!is_labeled("x/I-PER y/I-PER", &labels, ""));
    // Two different chains.
    assert!(!is_labeled("x/B-PER y/B-ORG", &labels, ""));
    // Label outside the allowed set.
    assert!(!is_labeled("x/B-DATE", &labels, ""));
}

#[test]
fn is_labeled_rejects_partial_span_selection() {
    let labels = ["PER", "ORG"];
    let text = "barack/B-PER hussein/I-PER obama/I-PER";
    assert!(is_labeled(text, &labels, ""));
    // The selection stops short of the span's continuation.
    assert!(!is_labeled(text, &labels, "jr/I-PER was born in"));
    assert!(is_labeled(text, &labels, "was born in"));
}

// =============================================================================
// sentence_columns
// =============================================================================

#[test]
fn sentence_columns_pads_with_o() {
    let text = "Barack/B-PER/B-PRES Obama/I-PER/I-PRES was born in 1961/B-DATE";
    assert_eq!(
        sentence_columns(text, 1),
        vec![
            row("Barack", &["B-PER"]),
            row("Obama", &["I-PER"]),
            row("was", &["O"]),
            row("born", &["O"]),
            row("in", &["O"]),
            row("1961", &["B-DATE"]),
        ]
    );
    assert_eq!(
        sentence_columns(text, 2),
        vec![
            row("Barack", &["B-PER", "B-PRES"]),
            row("Obama", &["I-PER", "I-PRES"]),
            row("was", &["O", "O"]),
            row("born", &["O", "O"]),
            row("in", &["O", "O"]),
            row("1961", &["B-DATE", "O"]),
        ]
    );
    assert_eq!(
        sentence_columns(text, 3),
        vec![
            row("Barack", &["B-PER", "B-PRES", "O"]),
            row("Obama", &["I-PER", "I-PRES", "O"]),
            row("was", &["O", "O", "O"]),
            row("born", &["O", "O", "O"]),
            row("in", &["O", "O", "O"]),
            row("1961", &["B-DATE", "O", "O"]),
        ]
    );
}

#[test]
fn sentence_columns_collapses_whitespace_runs() {
    let text = "Barack/B-PER/B-PRES     Obama/I-PER/I-PRES was born    in 1961/B-DATE";
    assert_eq!(
        sentence_columns(text, 1),
        vec![
            row("Barack", &["B-PER"]),
            row("Obama", &["I-PER"]),
            row("was", &["O"]),
            row("born", &["O"]),
            row("in", &["O"]),
            row("1961", &["B-DATE"]),
        ]
    );
}

#[test]
fn sentence_columns_preserves_slash_content() {
    let text = "a/B-x b/I-x/B-y c/d/e/I-x/I-y/B-z";
    assert_eq!(
        sentence_columns(text, 1),
        vec![row("a", &["B-x"]), row("b", &["I-x"]), row("c/d/e", &["I-x"])]
    );
    assert_eq!(
        sentence_columns(text, 2),
        vec![
            row("a", &["B-x", "O"]),
            row("b", &["I-x", "B-y"]),
            row("c/d/e", &["I-x", "I-y"]),
        ]
    );
    assert_eq!(
        sentence_columns(text, 3),
        vec![
            row("a", &["B-x", "O", "O"]),
            row("b", &["I-x", "B-y", "O"]),
            row("c/d/e", &["I-x", "I-y", "B-z"]),
        ]
    );
}

// =============================================================================
// closest_labeled_span
// =============================================================================

const LINE: &str = "barack/B-PER obama/I-PER was born in Hawaii/B-LOC in 1961/B-DATE";

#[test]
fn resolves_full_run_from_begin_word() {
    assert_eq!(closest_labeled_span(LINE, 5).unwrap(), Some((0, 23)));
}

#[test]
fn resolves_full_run_from_continuation_word() {
    // Index 15 sits inside obama/I-PER; the scan walks left to the B-.
    assert_eq!(closest_labeled_span(LINE, 15).unwrap(), Some((0, 23)));
}

#[test]
fn resolves_single_word_span() {
    // Index 40 sits inside Hawaii/B-LOC (chars 37..49).
    assert_eq!(closest_labeled_span(LINE, 40).unwrap(), Some((37, 48)));
}

#[test]
fn untagged_word_yields_none() {
    assert_eq!(closest_labeled_span(LINE, 27).unwrap(), None);
}

#[test]
fn index_past_line_end_yields_none() {
    assert_eq!(closest_labeled_span(LINE, 65).unwrap(), None);
    assert_eq!(closest_labeled_span("", 0).unwrap(), None);
}

#[test]
fn continuation_without_begin_yields_none() {
    assert_eq!(closest_labeled_span("x y/I-PER", 3).unwrap(), None);
}

#[test]
fn multiple_nesting_levels_cannot_be_resolved() {
    let line = "barack/B-PER/B-PRES obama/I-PER/I-PRES";
    assert!(matches!(
        closest_labeled_span(line, 3),
        Err(Error::AmbiguousNesting(_))
    ));
}

// =============================================================================
// Multi-line CONLL conversion
// =============================================================================

#[test]
fn to_conll_defaults_to_observed_depth() {
    let text = "Barack/B-PER/B-PRES Obama/I-PER/I-PRES\nwas born";
    assert_eq!(max_tag_depth(text), 2);
    assert_eq!(
        to_conll(text, None),
        "Barack B-PER B-PRES\nObama I-PER I-PRES\n\nwas O O\nborn O O\n\n"
    );
}

#[test]
fn to_conll_explicit_columns_truncate_and_pad() {
    let text = "Barack/B-PER/B-PRES Obama/I-PER/I-PRES";
    assert_eq!(
        to_conll(text, Some(1)),
        "Barack B-PER\nObama I-PER\n\n"
    );
}
