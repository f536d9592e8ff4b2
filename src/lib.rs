//! Semantic parsing tool (atc_semparse) is a library to convert Air Traffic Control (ATC)
//! utterances rendered as text into a nested logical form ([LF](SemanticParser::parse)) over a
//! closed vocabulary of ATC categories, plus an equivalent JSON tree.
//!
//! # Overview
//! ATC phraseology is rigid enough that a closed regex vocabulary can collapse most of an
//! utterance into category-tagged placeholder tokens, yet free enough that the remaining
//! composition is best handled by a grammar.
//! The library therefore runs a three stage pipeline:
//! lexical abstraction with an ordered regex battery, grammar driven composition with a
//! Combinatory Categorial Grammar (CCG) chart parser over a synthesised lexicon, and iterative
//! refinement that re-parses the produced logical form until it stabilises.
//!
//! # Design
//!
//! The parser is configured entirely from four text resources: a regex table mapping patterns to
//! categories, a preposition list, a category filter, and a table of hand written complex CCG
//! rules. From these a textual lexicon is synthesised and compiled into a chart parser.
//! Utterances are reduced to placeholder streams (`callsign1 intnumber1 ...`), parsed into a
//! logical form such as `_CALLSIGN_(_AIRCRAFT_(*Southwest*),_INTNUMBER_(*578*))`, and re-parsed
//! with a narrower lexicon until a fixed point or the step cap is reached.
//! A final projection rewrites the logical form into a JSON object with disambiguated keys.
//!
//! # Example
//!
//! ```
//! use atc_semparse::SemanticParser;
//!
//! let regex_table = "
//! #ACKNOWLEDGE
//! r\"\\broger\\b\"
//! r\"\\bwilco\\b\"
//!
//! #CONTEXT
//! r\"\\bcontext\\b\"
//! ";
//!
//! let parser = SemanticParser::new(regex_table, "to\nthe\n", "", "").unwrap();
//! let outcome = parser.parse("roger", 2);
//! assert_eq!(outcome.logical_form.trim_end(), "_ACKNOWLEDGE_(*roger*);");
//! assert_eq!(outcome.json_form, r#"{"ACKNOWLEDGE_1":"roger"}"#);
//! ```

mod abstraction;
mod ccg;
mod cleanup;
mod error;
pub mod examples;
mod json;
mod lexicon;
mod logger;
mod normalize;
mod placeholder;
mod pipeline;
mod resource;
mod segment;

use once_cell::unsync::OnceCell;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub use ccg::chart::Derivation;

/// Number of reserved `X1..X12` slots for spans that match no regex and are not prepositions.
pub const UNKNOWN_SLOTS: usize = 12;

/// Maximum number of `_context_` expansions prepended to a stream before giving up on a
/// whole-stream parse.
pub const MAX_EXPANSIONS: usize = 1;

/// Longest prefix, in tokens, tried by the segmenting fallback.
pub const MAX_SEGMENT_LENGTH: usize = 7;

#[derive(Debug)]
/// An error raised while loading one of the four text resources or synthesising the lexicon.
///
/// Resource errors are fatal: a [SemanticParser] cannot be built from contradictory or
/// malformed resources. Capacity overflows and failed parses are not errors; see
/// [ParseOutcome::overflows] and the empty logical form.
pub struct ResourceError {
    what: String,
    message: String,
}

#[derive(Debug)]
/// A single pattern of the regex table together with its category and priority key.
pub struct RegexEntry {
    pub category: String,
    /// Lowercased pattern text as found in the resource, without the `r"…"` wrapper.
    pub source: String,
    /// Count of backslash separated fragments after stripping `(?…)` groups.
    /// Replacement iterates entries by descending complexity with a stable tie break.
    pub complexity: usize,
    regex: Regex,
}

#[derive(Debug)]
/// The parsed regex resource: ordered patterns per category plus the category set itself.
pub struct RegexTable {
    entries: Vec<RegexEntry>,
    /// Entry indices sorted by descending complexity, ties in resource order.
    priority: Vec<usize>,
    /// Categories in first-appearance order.
    categories: Vec<String>,
}

#[derive(Debug)]
/// Placeholder pools per category: `callsign1..callsignN` where N is the category cap.
pub struct PlaceholderRegistry {
    pools: Vec<(String, Vec<String>)>,
    category_of: HashMap<String, String>,
}

#[derive(Debug)]
/// Hand written CCG rule bodies grouped by the category they are written against.
///
/// Entries are kept in resource order; each is later expanded once per placeholder of its
/// section category when the lexicon is synthesised.
pub struct ComplexRuleSet {
    sections: Vec<(String, Vec<String>)>,
}

#[derive(Debug)]
/// Categories admitted by the filtered lexicon used by refinement passes.
pub struct CategoryFilter {
    names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A syntactic CCG category: a primitive or a slash type.
pub enum SynCat {
    Atom(String),
    /// `X/Y` — looks for an argument `Y` to the right.
    Forward(Box<SynCat>, Box<SynCat>),
    /// `X\Y` — looks for an argument `Y` to the left.
    Backward(Box<SynCat>, Box<SynCat>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A lambda semantic term attached to a lexicon entry or derivation.
pub enum SemTerm {
    Var(String),
    Const(String),
    /// Flattened application `f(a,b,…)`.
    Apply(Box<SemTerm>, Vec<SemTerm>),
    /// `\x y.body`.
    Lambda(Vec<String>, Box<SemTerm>),
}

#[derive(Debug)]
/// One rule of the synthesised lexicon: `token => SYNCAT {SEM}`.
pub struct LexEntry {
    pub token: String,
    pub syn: SynCat,
    pub sem: SemTerm,
}

/// A CCG lexicon in both textual and compiled form.
///
/// The canonical textual form is synthesised from the category table, the preposition list,
/// the complex rule set and (for refinement passes) the category filter; it is then parsed
/// into [LexEntry] values used by the chart parser. Both representations are immutable after
/// construction and safe to share.
pub struct Lexicon {
    text: String,
    primitives: Vec<String>,
    entries: Vec<LexEntry>,
    index: HashMap<String, Vec<usize>>,
    words: OnceCell<HashSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Binary combination rules applied by the chart parser.
pub enum Combinator {
    ForwardApplication,
    BackwardApplication,
    ForwardComposition,
    BackwardComposition,
}

/// A chart parser over a [Lexicon] applying the Application and Composition rule sets.
pub struct CcgParser {
    lexicon: Rc<Lexicon>,
    rules: Vec<Combinator>,
    log: OnceCell<Log<&'static str>>,
}

#[derive(Debug, Default)]
/// Per-utterance substitution state: placeholder → surface (or embedded term) in insertion
/// order, per-category counters, and the capacity overflow tally.
pub struct ReplacementMap {
    replacements: Vec<(String, String)>,
    counters: HashMap<String, usize>,
    overflows: usize,
}

/// The pipeline controller owning the resource tables, the two lexicons and the two parsers.
///
/// Construction is fallible ([ResourceError]); parsing is not. All state created per
/// utterance lives in local [ReplacementMap]s, so a `SemanticParser` may be shared freely
/// by reference once built.
pub struct SemanticParser {
    table: RegexTable,
    registry: PlaceholderRegistry,
    prepositions: Vec<String>,
    lexicon_full: Rc<Lexicon>,
    lexicon_filtered: Rc<Lexicon>,
    parser_full: CcgParser,
    parser_filtered: CcgParser,
    log: OnceCell<Log<&'static str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of running the pipeline on one utterance.
pub struct ParseOutcome {
    /// The stable logical form; may be empty when nothing parsed.
    pub logical_form: String,
    /// JSON projection of the logical form. Always valid JSON.
    pub json_form: String,
    /// Number of spans elided because a category ran out of placeholders.
    pub overflows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Intermediate state of one refinement step, recorded by [SemanticParser::parse_debug].
pub struct StepTrace {
    pub step: usize,
    pub placeholders: String,
    pub logical_form: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Debug verbosity for a parser component, carrying the label printed with each diagnostic
/// line. The levels nest: `Default` reports the per-step placeholder streams, `Result` adds
/// parse counts per segment attempt, and `Verbose` also traces individual chart edges.
pub enum Log<T> {
    None,
    Default(T),
    Result(T),
    Verbose(T),
}
