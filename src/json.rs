//! Projection of a logical form into a JSON object with disambiguated keys.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static SINGLETON: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\{"[\w\s.'-]+"\}"#).unwrap());
static COMMA_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s+\}").unwrap());
static SPACE_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\}").unwrap());
static OBJECT_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[a-zA-Z\s]+":"#).unwrap());
static DUP_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)"([a-z]+)":\{"#).unwrap());

/// Function words whose singleton objects are merged into their child's key,
/// `"the":{"k":…}` becoming `"the k":…`, at brace depths 0..=3.
const MERGE_WORDS: &[&str] = &["the", "have", "your", "are", "over", "be", "an"];

/// Rewrite a logical form into JSON text. The result is always valid JSON; duplicate keys
/// are disambiguated with per-key occurrence counters.
pub fn project_json(lf: &str) -> String {
    let core = lf
        .trim_matches(|c| matches!(c, '\t' | '\n' | '\\'))
        .replace(';', ",")
        .replace("_(", "\":{")
        .replace('_', "\"")
        .replace(')', "}")
        .replace('*', "\"");
    let mut s = format!("{{{}}}", core);

    // Leaves: {"token"} -> "token".
    loop {
        let next = SINGLETON
            .replace_all(&s, |caps: &regex::Captures| {
                let m = caps.get(0).unwrap().as_str();
                m[1..m.len() - 1].to_string()
            })
            .to_string();
        if next == s {
            break;
        }
        s = next;
    }

    // Trailing separators before a closing brace.
    s = to_fixpoint(s, &COMMA_BRACE);
    s = to_fixpoint(s, &SPACE_BRACE);

    s = collapse_duplicate_heads(s);

    for word in MERGE_WORDS {
        for depth in 0..=3 {
            s = merge_function_word(s, word, depth);
        }
    }

    disambiguate_keys(s)
}

fn to_fixpoint(mut s: String, pattern: &Regex) -> String {
    loop {
        let next = pattern.replace_all(&s, "}").to_string();
        if next == s {
            return s;
        }
        s = next;
    }
}

fn replace_first(s: &str, from: &str, to: &str) -> String {
    match s.find(from) {
        Some(at) => {
            let mut out = String::with_capacity(s.len());
            out.push_str(&s[..at]);
            out.push_str(to);
            out.push_str(&s[at + from.len()..]);
            out
        }
        None => s.to_string(),
    }
}

fn is_flat_content(c: char) -> bool {
    c == '"' || c.is_alphanumeric() || c == '_' || c.is_whitespace() || c == ':' || c == ','
}

/// `"k":{"k":{…}}` -> `"k":{…}` for flat bodies, iterated to a fixed point.
fn collapse_duplicate_heads(mut s: String) -> String {
    loop {
        let mut edits: Vec<(String, String)> = Vec::new();
        let mut pos = 0;
        while let Some(caps) = DUP_HEAD.captures_at(&s, pos) {
            let m = caps.get(0).unwrap();
            let whole = m.as_str();
            let rest = &s[m.end()..];
            if rest.len() >= whole.len()
                && rest.as_bytes()[..whole.len()].eq_ignore_ascii_case(whole.as_bytes())
            {
                let body_start = m.end() + whole.len();
                let run_end = s[body_start..]
                    .find(|c: char| !is_flat_content(c))
                    .map_or(s.len(), |i| body_start + i);
                if run_end > body_start && s[run_end..].starts_with("}}") {
                    edits.push((
                        s[m.start()..run_end + 2].to_string(),
                        s[m.end()..run_end + 1].to_string(),
                    ));
                    pos = run_end + 2;
                    continue;
                }
            }
            pos = m.start() + 1;
        }
        if edits.is_empty() {
            return s;
        }
        let mut changed = false;
        for (from, to) in edits {
            let next = replace_first(&s, &from, &to);
            if next != s {
                changed = true;
                s = next;
            }
        }
        if !changed {
            return s;
        }
    }
}

fn is_merge_content(c: char) -> bool {
    c == '"'
        || c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || c == ':'
        || c == ','
        || c == '\''
        || c == '{'
        || c == '}'
}

/// One merge pass for a function word at one depth: `"w":{BODY}` -> `"w BODY…` when the body
/// ends with `depth` closing braces and is brace balanced.
fn merge_function_word(s: String, word: &str, depth: usize) -> String {
    let needle = format!("\"{}\":{{", word);
    let closers: String = "}".repeat(depth + 1);
    let mut edits: Vec<(String, String)> = Vec::new();
    let mut pos = 0;
    while let Some(at) = s[pos..].find(&needle).map(|i| pos + i) {
        let body_start = at + needle.len();
        // Lazy body: the shortest content run followed by the required closing braces.
        let mut e = body_start;
        let mut matched = None;
        while e < s.len() {
            if e > body_start && s[e..].starts_with(&closers) {
                matched = Some(e);
                break;
            }
            let c = match s[e..].chars().next() {
                Some(c) => c,
                None => break,
            };
            if !is_merge_content(c) {
                break;
            }
            e += c.len_utf8();
        }
        match matched {
            Some(e) => {
                let body = &s[body_start..e + depth];
                if brace_balanced(body) && body.starts_with('"') {
                    let to_replace = s[at..e + depth + 1].to_string();
                    let replace_by = format!("\"{} {}", word, &body[1..]);
                    edits.push((to_replace, replace_by));
                }
                pos = e + depth + 1;
            }
            None => pos = at + needle.len(),
        }
    }
    let mut s = s;
    for (from, to) in edits {
        s = s.replace(&from, &to);
    }
    s
}

fn brace_balanced(text: &str) -> bool {
    let mut open = 0usize;
    let mut close = 0usize;
    for c in text.chars() {
        if c == '{' {
            open += 1;
        }
        if c == '}' {
            close += 1;
        }
        if close > open {
            return false;
        }
    }
    open == close
}

/// Walk the keys left to right and suffix each occurrence with a per-key counter, making
/// every key unique inside its object. Composite keys produced by the merges count whole.
fn disambiguate_keys(mut s: String) -> String {
    let keys: Vec<String> = OBJECT_KEY
        .find_iter(&s)
        .map(|m| m.as_str().to_string())
        .collect();
    let mut counters: HashMap<String, usize> = HashMap::new();
    for key in keys {
        let counter = counters.entry(key.clone()).or_insert(0);
        *counter += 1;
        let stem = key.trim_start_matches('"').trim_end_matches(':').trim_end_matches('"');
        let renamed = format!("\"{}_{}\":", stem, counter);
        s = replace_first(&s, &key, &renamed);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_become_strings() {
        let json = project_json("_ACKNOWLEDGE_(*roger*); ");
        assert_eq!(json, r#"{"ACKNOWLEDGE_1":"roger"}"#);
    }

    #[test]
    fn nested_terms_become_objects() {
        let json = project_json("_SQUAWK_(_SQUAWK_(*squawk*),_INTNUMBER_(*5263*)); ");
        assert_eq!(
            json,
            r#"{"SQUAWK_1":{"SQUAWK_2":"squawk","INTNUMBER_1":"5263"}}"#
        );
    }

    #[test]
    fn function_words_merge_into_their_child() {
        let json =
            project_json("_CLEARED_(_CLEARED_(*cleared*),_the_(_PLACE_(*Atlanta*))); ");
        assert_eq!(
            json,
            r#"{"CLEARED_1":{"CLEARED_2":"cleared","the PLACE_1":"Atlanta"}}"#
        );
    }

    #[test]
    fn doubled_heads_collapse_into_one_object() {
        // A head wrapping only itself loses the redundant level.
        let json = project_json("_RUNWAY_(_RUNWAY_(_SIDE_(*left*))); ");
        assert_eq!(json, r#"{"RUNWAY_1":{"SIDE_1":"left"}}"#);
    }

    #[test]
    fn doubled_heads_with_siblings_keep_their_level() {
        // A sibling key at the outer level breaks the adjacency the collapse requires.
        let json = project_json("_RUNWAY_(_RUNWAY_(_SIDE_(*left*)),_INTNUMBER_(*27*)); ");
        assert_eq!(
            json,
            r#"{"RUNWAY_1":{"RUNWAY_2":{"SIDE_1":"left"},"INTNUMBER_1":"27"}}"#
        );
    }

    #[test]
    fn duplicate_keys_are_counted_independently() {
        let json = project_json("_THEN_(*then*); _THEN_(*again*); _VIA_(*via*); ");
        assert_eq!(
            json,
            r#"{"THEN_1":"then", "THEN_2":"again", "VIA_1":"via"}"#
        );
    }

    #[test]
    fn empty_logical_form_projects_to_an_empty_object() {
        assert_eq!(project_json(""), "{}");
    }

    #[test]
    fn projection_is_valid_json() {
        let json = project_json(
            "_CALLSIGN_(_AIRCRAFT_(*Southwest*),_INTNUMBER_(*578*)); _context_(*abracadabra*); ",
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_object());
    }
}
