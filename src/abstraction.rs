//! Lexical abstraction: the greedy regex battery that collapses raw text into placeholder
//! tokens, the unknown-span finder assigning `X1..X12`, and the logical-form flattener used
//! by refinement passes.

use crate::{PlaceholderRegistry, RegexTable, ReplacementMap};
use std::collections::HashSet;

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder → surface/term pairs in insertion order. Substitution into a parsed
    /// logical form walks this list and replaces each placeholder once.
    pub fn replacements(&self) -> &[(String, String)] {
        &self.replacements
    }

    /// Number of spans or terms that exceeded a category's placeholder pool.
    pub fn overflows(&self) -> usize {
        self.overflows
    }

    pub fn record(&mut self, placeholder: String, value: String) {
        self.replacements.push((placeholder, value));
    }

    /// Allocate the next placeholder of a category, or [None] once the pool is exhausted.
    fn allocate(&mut self, registry: &PlaceholderRegistry, category: &str) -> Option<String> {
        let counter = self.counters.entry(category.to_string()).or_insert(0);
        *counter += 1;
        if *counter > registry.cap(category) {
            self.overflows += 1;
            return None;
        }
        Some(format!("{}{}", category.to_lowercase(), counter))
    }

    /// Allocate the next placeholder of a (lowercase) head name without eliding on overflow.
    /// A placeholder past the cap has no lexicon entry, so the parse of its term is not
    /// guaranteed; the overflow tally still reports it.
    fn allocate_unchecked(&mut self, registry: &PlaceholderRegistry, head: &str) -> String {
        let counter = self.counters.entry(head.to_string()).or_insert(0);
        *counter += 1;
        if registry.placeholders(&head.to_uppercase()).is_some()
            && *counter > registry.cap(&head.to_uppercase())
        {
            self.overflows += 1;
        }
        format!("{}{}", head, counter)
    }
}

/// Collapse raw text into category placeholders.
///
/// Patterns are tried in descending complexity; after every replacement the scan restarts
/// from the most complex pattern, so the battery is greedy and first-match-wins. A span whose
/// category pool is exhausted is elided from the buffer.
pub fn text_to_placeholders(
    table: &RegexTable,
    registry: &PlaceholderRegistry,
    map: &mut ReplacementMap,
    command: &str,
) -> String {
    let mut buffer = command.to_string();
    'scan: loop {
        for entry in table.entries_by_priority() {
            if let Some((start, end)) = entry.first_span(&buffer) {
                let surface = buffer[start..end].to_string();
                match map.allocate(registry, &entry.category) {
                    Some(placeholder) => {
                        map.record(placeholder.clone(), surface);
                        buffer.replace_range(start..end, &placeholder);
                    }
                    None => {
                        buffer.replace_range(start..end, "");
                    }
                }
                continue 'scan;
            }
        }
        break;
    }
    buffer
}

/// Assign reserved `X` slots to spans that no regex covered.
///
/// The buffer is lowercased and freed of `:;,.+`. Tokens found on the left-hand side of any
/// lexicon rule are masked out; the residual runs are unknown spans, labelled longest first.
pub fn replace_unknown_spans(
    buffer: &str,
    lex_words: &HashSet<String>,
    map: &mut ReplacementMap,
) -> String {
    let cleaned: String = buffer
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ':' | ';' | ',' | '.' | '+'))
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    struct Run {
        start: usize,
        len: usize,
        text: String,
    }

    let mut runs: Vec<Run> = Vec::new();
    let mut at = 0;
    while at < tokens.len() {
        if lex_words.contains(tokens[at]) {
            at += 1;
            continue;
        }
        let start = at;
        while at < tokens.len() && !lex_words.contains(tokens[at]) {
            at += 1;
        }
        let text = tokens[start..at].join(" ");
        let text = text.trim_matches(|c| matches!(c, '.' | ',' | ':' | ';' | ' ')).to_string();
        if !text.is_empty() && text != "?" && text != "+" {
            runs.push(Run {
                start,
                len: at - start,
                text,
            });
        }
    }

    // Distinct run texts, longest first; ties keep first-appearance order.
    let mut distinct: Vec<String> = Vec::new();
    for run in &runs {
        if !distinct.contains(&run.text) {
            distinct.push(run.text.clone());
        }
    }
    distinct.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut slot_at: Vec<Option<String>> = vec![None; tokens.len()];
    let mut consumed = vec![false; tokens.len()];
    let mut id = 0;
    for text in &distinct {
        for run in runs.iter().filter(|r| &r.text == text) {
            id += 1;
            let slot = format!("X{}", id);
            slot_at[run.start] = Some(slot.clone());
            for i in run.start..run.start + run.len {
                consumed[i] = true;
            }
            map.record(slot, text.clone());
        }
    }

    let mut out: Vec<String> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if let Some(slot) = &slot_at[i] {
            out.push(slot.clone());
        } else if !consumed[i] {
            out.push(collapse_stray_slot(token));
        }
    }
    out.join(" ")
}

/// A stray `x<digits>` token is collapsed to the upper-case slot form.
fn collapse_stray_slot(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some('x') => {
            let rest: &str = &token[1..];
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return format!("X{}", rest);
            }
        }
        _ => {}
    }
    token.to_string()
}

/// Flatten a logical form into a fresh placeholder stream, one placeholder per top-level
/// `;`-separated term, keyed by the term's outermost category name.
pub fn lf_to_placeholders(
    lf: &str,
    registry: &PlaceholderRegistry,
    map: &mut ReplacementMap,
) -> String {
    let mut out = String::new();
    for item in lf.split(';') {
        let mut term = item.trim().to_string();
        if term.is_empty() {
            continue;
        }
        if term == term.to_lowercase() {
            // A bare keyword term keeps no category of its own.
            term = format!("_context_({})", term);
        }
        let mut head = String::new();
        for segment in term.split("_(") {
            if segment != segment.to_lowercase() || segment.contains("context") {
                head = segment.trim_matches('_').to_lowercase();
                break;
            }
        }
        if head.is_empty() {
            continue;
        }
        let placeholder = map.allocate_unchecked(registry, &head);
        out.push_str(&placeholder);
        out.push(' ');
        map.record(placeholder, term);
    }
    out.trim_end().to_string()
}
