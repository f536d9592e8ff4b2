use crate::examples::atc::{atc_parser, CATEGORY_FILTERS, LEX_COMPLEX, PREPOSITIONS, REGEX_TABLE};
use crate::SemanticParser;

const CORPUS: &[&str] = &[
    "Southwest 578 cleared to Atlanta via radar vectors then V222 to CRG then direct \
     Climb and maintain 5000 expect 35000 ten minutes after departure Departure \
     frequency 124.85 squawk 5263",
    "roger",
    "no traffic",
    "cleared to land runway 27L",
    "squawk 1200 and 1300",
    "roger abracadabra wilco xyzzy",
    "delta 42 expect 9000 ten minutes after departure",
];

fn balanced(lf: &str) -> bool {
    let mut depth = 0i64;
    for c in lf.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

#[test]
fn logical_forms_stay_bracket_balanced() {
    let parser = atc_parser().unwrap();
    for command in CORPUS {
        let (outcome, steps) = parser.parse_debug(command, 3);
        assert!(balanced(&outcome.logical_form), "unbalanced: {}", outcome.logical_form);
        for step in &steps {
            assert!(balanced(&step.logical_form), "unbalanced step: {}", step.logical_form);
        }
    }
}

#[test]
fn stage_zero_streams_are_closed_over_the_vocabulary() {
    let parser = atc_parser().unwrap();
    for command in CORPUS {
        let (_, steps) = parser.parse_debug(command, 1);
        for token in steps[0].placeholders.split_whitespace() {
            let known = parser.registry().category_of(token).is_some()
                || parser.prepositions().iter().any(|p| p == token)
                || parser.full_lexicon().words().contains(token)
                || is_unknown_slot(token);
            assert!(known, "stray token '{}' in '{}'", token, steps[0].placeholders);
        }
    }
}

fn is_unknown_slot(token: &str) -> bool {
    token
        .strip_prefix('X')
        .and_then(|rest| rest.parse::<usize>().ok())
        .map_or(false, |i| (1..=crate::UNKNOWN_SLOTS).contains(&i))
}

#[test]
fn repeated_runs_are_byte_identical() {
    let parser = atc_parser().unwrap();
    for command in CORPUS {
        let first = parser.parse(command, 3);
        let second = parser.parse(command, 3);
        assert_eq!(first, second);
        // A freshly built pipeline agrees as well.
        let rebuilt = atc_parser().unwrap().parse(command, 3);
        assert_eq!(first, rebuilt);
    }
}

#[test]
fn refinement_never_adds_terms() {
    let parser = atc_parser().unwrap();
    for command in CORPUS {
        let (_, steps) = parser.parse_debug(command, 3);
        let counts: Vec<usize> = steps
            .iter()
            .map(|s| s.logical_form.split(';').filter(|t| !t.trim().is_empty()).count())
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[1] <= pair[0], "terms grew across steps: {:?}", counts);
        }
    }
}

#[test]
fn converged_forms_are_stable_under_more_steps() {
    let parser = atc_parser().unwrap();
    for command in ["roger", "no traffic", "cleared to land runway 27L"] {
        let short = parser.parse(command, 2);
        let long = parser.parse(command, 5);
        assert_eq!(short.logical_form, long.logical_form);
    }
}

#[test]
fn debug_tracing_never_changes_the_outcome() {
    let parser = atc_parser().unwrap();
    for command in CORPUS {
        let plain = parser.parse(command, 3);
        let (traced, steps) = parser.parse_debug(command, 3);
        assert_eq!(plain, traced);
        assert!(!steps.is_empty());
        assert_eq!(steps.last().map(|s| s.logical_form.as_str()), Some(traced.logical_form.as_str()));
    }
}

#[test]
fn json_is_always_parseable() {
    let parser = atc_parser().unwrap();
    for command in CORPUS {
        let outcome = parser.parse(command, 3);
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&outcome.json_form);
        assert!(parsed.is_ok(), "bad JSON for '{}': {}", command, outcome.json_form);
    }
}

#[test]
fn a_fresh_category_adds_one_pool_of_simple_rules() {
    let extended_table = format!("{}\n#GREETING\nr\"\\bbonjour\\b\"\n", REGEX_TABLE);
    let base = atc_parser().unwrap();
    let extended =
        SemanticParser::new(&extended_table, PREPOSITIONS, CATEGORY_FILTERS, LEX_COMPLEX).unwrap();

    // Default cap: five placeholders, each with exactly one simple rule.
    let new_simple: Vec<_> = extended
        .full_lexicon()
        .entries()
        .iter()
        .filter(|e| e.token.starts_with("greeting"))
        .collect();
    assert_eq!(new_simple.len(), 5);
    assert!(new_simple.iter().all(|e| e.syn.is_atom()));

    // Utterances that never mention the new category are unaffected.
    for command in CORPUS {
        assert_eq!(base.parse(command, 3), extended.parse(command, 3));
    }
}
