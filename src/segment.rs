//! The segmenting driver: whole-stream parse attempts with bounded `_context_` expansion,
//! falling back to greedy consumption of the longest parseable prefix.

use crate::cleanup::{clean_lf, unwrap_context};
use crate::{CcgParser, ReplacementMap, MAX_EXPANSIONS, MAX_SEGMENT_LENGTH};

/// Parse one segment, expanding with up to [MAX_EXPANSIONS] `_context_` prefixes.
/// On success the first derivation's semantics is returned with every recorded placeholder
/// substituted back once, wrapped in `*…*` literal markers.
pub(crate) fn parse_segment(
    parser: &CcgParser,
    segment: &str,
    map: &ReplacementMap,
) -> Option<String> {
    let mut expanded = segment.to_string();
    let mut expansions = 0;
    loop {
        let tokens: Vec<&str> = expanded.split_whitespace().collect();
        let parses = parser.parse(&tokens);
        if let Some(first) = parses.first() {
            let mut lf = first.sem.to_string();
            for (placeholder, value) in map.replacements() {
                lf = replace_word_once(&lf, placeholder, &format!("*{}*", value));
            }
            return Some(lf);
        }
        if expansions >= MAX_EXPANSIONS {
            return None;
        }
        expansions += 1;
        expanded = format!("_context_ {}", expanded);
    }
}

/// Run one full pass over a placeholder stream: whole-stream attempt first, then the
/// segmenting fallback. Accepted segment forms are joined with `; `.
pub(crate) fn drive(
    parser: &CcgParser,
    stream: &str,
    map: &ReplacementMap,
    step: usize,
) -> String {
    let mut lf_final = String::new();
    match parse_segment(parser, stream, map) {
        Some(lf) => {
            lf_final.push_str(&postprocess(&lf, step));
            lf_final.push_str("; ");
        }
        None => {
            let mut rest: Vec<String> = stream.split_whitespace().map(String::from).collect();
            while !rest.is_empty() {
                let mut consumed = 0;
                for len in (1..=rest.len().min(MAX_SEGMENT_LENGTH)).rev() {
                    let segment = rest[..len].join(" ");
                    if let Some(lf) = parse_segment(parser, &segment, map) {
                        lf_final.push_str(&postprocess(&lf, step));
                        lf_final.push_str("; ");
                        consumed = len;
                        break;
                    }
                }
                if consumed == 0 {
                    // Even the single-token prefix failed; the remainder is discarded.
                    break;
                }
                rest.drain(..consumed);
            }
        }
    }
    if step > 0 {
        lf_final = lf_final.replace("STOP_(", "_(").replace("\n*", "");
    }
    lf_final
}

fn postprocess(lf: &str, step: usize) -> String {
    let lf = unwrap_context(lf);
    if step > 0 {
        clean_lf(&lf)
    } else {
        lf
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Replace the first whole-word occurrence of `word`.
fn replace_word_once(haystack: &str, word: &str, replacement: &str) -> String {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(at) = haystack[from..].find(word).map(|i| from + i) {
        let end = at + word.len();
        let boundary_before = at == 0 || !is_word_byte(bytes[at - 1]);
        let boundary_after = end >= bytes.len() || !is_word_byte(bytes[end]);
        if boundary_before && boundary_after {
            let mut out = String::with_capacity(haystack.len() + replacement.len());
            out.push_str(&haystack[..at]);
            out.push_str(replacement);
            out.push_str(&haystack[end..]);
            return out;
        }
        from = at + 1;
    }
    haystack.to_string()
}
