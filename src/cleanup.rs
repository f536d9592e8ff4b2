//! Structural cleanup of logical forms produced by refinement passes.
//!
//! Each rewrite runs once, top to bottom; none iterates to a fixed point, so distinct
//! operator nestings are never over-collapsed.

use once_cell::sync::Lazy;
use regex::Regex;

static HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(_[a-z]+_)\(").unwrap());
static CONTEXT_SHELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b_context_\(_(.+)\)").unwrap());

/// Remove a `_context_` shell whose argument is itself a function term.
pub fn unwrap_context(lf: &str) -> String {
    match CONTEXT_SHELL.captures(lf) {
        Some(caps) => {
            let whole = caps.get(0).unwrap().as_str();
            let inner = format!("_{}", caps.get(1).unwrap().as_str());
            lf.replace(whole, &inner)
        }
        None => lf.to_string(),
    }
}

/// Clean a logical form after a refinement pass: strip substitution artefacts, then apply
/// the three duplicate-function collapses.
pub fn clean_lf(lf: &str) -> String {
    let lf = lf.replace("*_", "_").replace(")*", ")");
    let lf = collapse_flat_duplicate(&lf);
    let lf = collapse_sandwiched_duplicate(&lf);
    collapse_nested_duplicate(&lf)
}

fn is_flat_char(c: char) -> bool {
    c.is_whitespace() || c.is_alphanumeric() || matches!(c, '_' | '-' | ',' | '.' | '*' | '\'')
}

fn is_nested_char(c: char) -> bool {
    is_flat_char(c) || c == '(' || c == ')'
}

fn flat_run_end(lf: &str, from: usize) -> usize {
    lf[from..]
        .find(|c: char| !is_flat_char(c))
        .map_or(lf.len(), |i| from + i)
}

fn nested_run_end(lf: &str, from: usize) -> usize {
    lf[from..]
        .find(|c: char| !is_nested_char(c))
        .map_or(lf.len(), |i| from + i)
}

/// Whether a head repeats immediately after its opening parenthesis; returns the offset just
/// past the repeated head's `(`.
fn repeated_head(lf: &str, head: &str, after: usize) -> Option<usize> {
    let rest = lf.as_bytes().get(after..)?;
    if rest.len() > head.len()
        && rest[..head.len()].eq_ignore_ascii_case(head.as_bytes())
        && rest[head.len()] == b'('
    {
        Some(after + head.len() + 1)
    } else {
        None
    }
}

/// `F(F(args))` → `F(args)` where args hold no nested parentheses.
fn collapse_flat_duplicate(lf: &str) -> String {
    let mut edits: Vec<(String, String)> = Vec::new();
    let mut pos = 0;
    while let Some(caps) = HEAD.captures_at(lf, pos) {
        let m = caps.get(0).unwrap();
        let head = caps.get(1).unwrap().as_str();
        if let Some(args_start) = repeated_head(lf, head, m.end()) {
            let run_end = flat_run_end(lf, args_start);
            if run_end > args_start && lf[run_end..].starts_with("))") {
                let inner_start = m.end();
                edits.push((
                    lf[m.start()..run_end + 2].to_string(),
                    lf[inner_start..run_end + 1].to_string(),
                ));
                pos = run_end + 2;
                continue;
            }
        }
        pos = m.start() + 1;
    }
    apply_edits(lf, edits)
}

/// `F(G(F(args)))` → `G(F(args))` where args hold no nested parentheses.
fn collapse_sandwiched_duplicate(lf: &str) -> String {
    let mut edits: Vec<(String, String)> = Vec::new();
    let mut pos = 0;
    while let Some(caps) = HEAD.captures_at(lf, pos) {
        let m = caps.get(0).unwrap();
        let head = caps.get(1).unwrap().as_str();
        let middle = match HEAD.captures_at(lf, m.end()) {
            Some(mid) if mid.get(0).unwrap().start() == m.end() => mid,
            _ => {
                pos = m.start() + 1;
                continue;
            }
        };
        if let Some(args_start) = repeated_head(lf, head, middle.get(0).unwrap().end()) {
            let run_end = flat_run_end(lf, args_start);
            if run_end > args_start && lf[run_end..].starts_with(")))") {
                let inner_start = m.end();
                edits.push((
                    lf[m.start()..run_end + 3].to_string(),
                    lf[inner_start..run_end + 2].to_string(),
                ));
                pos = run_end + 3;
                continue;
            }
        }
        pos = m.start() + 1;
    }
    apply_edits(lf, edits)
}

/// `F(F(args))` → `F(args)` where args may nest, guarded by a bracket balance check on the
/// replacement: a substring that fully closes and then reopens is left alone.
fn collapse_nested_duplicate(lf: &str) -> String {
    let mut edits: Vec<(String, String)> = Vec::new();
    let mut pos = 0;
    while let Some(caps) = HEAD.captures_at(lf, pos) {
        let m = caps.get(0).unwrap();
        let head = caps.get(1).unwrap().as_str();
        if let Some(args_start) = repeated_head(lf, head, m.end()) {
            let region_end = nested_run_end(lf, args_start);
            // Greedy: the replacement ends at the last `))` inside the run.
            let bytes = lf.as_bytes();
            let mut found = None;
            let mut e = region_end.saturating_sub(2);
            while e > args_start {
                if bytes[e] == b')' && bytes[e + 1] == b')' {
                    found = Some(e);
                    break;
                }
                e -= 1;
            }
            if let Some(e) = found {
                let inner_start = m.end();
                let replace_by = &lf[inner_start..e + 1];
                if balanced_once(replace_by) {
                    edits.push((
                        lf[m.start()..e + 2].to_string(),
                        replace_by.to_string(),
                    ));
                }
                pos = e + 2;
                continue;
            }
        }
        pos = m.start() + 1;
    }
    apply_edits(lf, edits)
}

/// Bracket sanity for a replacement candidate: no prefix closes more than it opens, the
/// total is balanced, and once the counts first meet no further bracket may follow.
fn balanced_once(text: &str) -> bool {
    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut min_equal = 0usize;
    for c in text.chars() {
        if c == '(' {
            opened += 1;
        }
        if c == ')' {
            closed += 1;
        }
        if opened < closed {
            return false;
        }
        if opened == closed && min_equal == 0 && opened > 0 {
            min_equal = opened;
        }
        if min_equal > 0 && (min_equal < opened || min_equal < closed) {
            return false;
        }
    }
    opened == closed
}

fn apply_edits(lf: &str, edits: Vec<(String, String)>) -> String {
    let mut out = lf.to_string();
    for (from, to) in edits {
        out = out.replace(&from, &to);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_shell_is_unwrapped() {
        assert_eq!(
            unwrap_context("_context_(_ACKNOWLEDGE_(*roger*))"),
            "_ACKNOWLEDGE_(*roger*)"
        );
        // A literal argument keeps its shell.
        assert_eq!(
            unwrap_context("_context_(*abracadabra*)"),
            "_context_(*abracadabra*)"
        );
    }

    #[test]
    fn flat_duplicates_collapse() {
        assert_eq!(clean_lf("_VIA_(_VIA_(*via*))"), "_VIA_(*via*)");
        assert_eq!(
            clean_lf("_RADAR_(_RADAR_(*radar vectors*))"),
            "_RADAR_(*radar vectors*)"
        );
    }

    #[test]
    fn sandwiched_duplicates_drop_the_outer_head() {
        assert_eq!(
            clean_lf("_TRAFFIC_(_no_(_TRAFFIC_(*traffic*)))"),
            "_no_(_TRAFFIC_(*traffic*))"
        );
    }

    #[test]
    fn nested_duplicates_collapse_when_balanced() {
        assert_eq!(
            clean_lf("_SQUAWK_(_SQUAWK_(_SQUAWK_(*squawk*),_INTNUMBER_(*5263*)))"),
            "_SQUAWK_(_SQUAWK_(*squawk*),_INTNUMBER_(*5263*))"
        );
    }

    #[test]
    fn unbalanced_carves_are_rejected() {
        // The doubled head wraps a term whose brackets fully close before a sibling opens;
        // collapsing would carve across siblings, so the nesting must survive.
        let lf = "_CLEARED_(_CLEARED_(_CLEARED_(_CLEARED_(*cleared*),_TO_(*to*))),_VIA_(*via*))";
        assert_eq!(clean_lf(lf), lf);
    }

    #[test]
    fn substitution_artefacts_are_stripped() {
        // The stray stars from substitution go first, which then exposes the flat collapse.
        assert_eq!(clean_lf("_THEN_(*_THEN_(*then*))*"), "_THEN_(*then*)");
    }
}
