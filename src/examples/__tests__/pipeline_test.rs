use crate::examples::atc::atc_parser;

/// Top-level heads of a `; `-joined logical form.
fn heads(lf: &str) -> Vec<String> {
    lf.split(';')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.split("_(")
                .next()
                .unwrap()
                .trim_matches('_')
                .to_string()
        })
        .collect()
}

fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn full_clearance_reduces_to_eight_heads() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse(
        "Southwest 578 cleared to Atlanta via radar vectors then V222 to CRG then direct \
         Climb and maintain 5000 expect 35000 ten minutes after departure Departure \
         frequency 124.85 squawk 5263",
        3,
    );

    assert_eq!(
        heads(&outcome.logical_form),
        vec![
            "CALLSIGN",
            "CLEARED",
            "THEN",
            "THEN",
            "ALTITUDECHANGE",
            "EXPECT",
            "DEPARTURE",
            "SQUAWK"
        ]
    );
    for needle in [
        "_AIRCRAFT_(*Southwest*)",
        "_INTNUMBER_(*578*)",
        "_PLACE_(*Atlanta*)",
        "_REALNUMBER_(*124.85*)",
        "_INTNUMBER_(*5263*)",
    ] {
        assert_eq!(
            count_occurrences(&outcome.logical_form, needle),
            1,
            "expected exactly one {} in {}",
            needle,
            outcome.logical_form
        );
    }
    assert_eq!(outcome.overflows, 0);
}

#[test]
fn single_word_acknowledgement_stabilises_after_one_stage() {
    let parser = atc_parser().unwrap();
    let (outcome, steps) = parser.parse_debug("roger", 3);

    assert_eq!(outcome.logical_form.trim_end(), "_ACKNOWLEDGE_(*roger*);");
    // Stage 1 reproduced stage 0, so stage 2 never ran.
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].logical_form, steps[1].logical_form);
}

#[test]
fn negation_is_special_cased() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("no traffic", 3);
    assert!(
        outcome.logical_form.starts_with("_no_("),
        "got {}",
        outcome.logical_form
    );
    assert_eq!(
        outcome.logical_form.trim_end(),
        "_no_(_TRAFFIC_(*traffic*));"
    );
}

#[test]
fn landing_clearance_keeps_the_runway_literal() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("cleared to land runway 27L", 3);
    assert!(outcome.logical_form.contains("_CLEARED_"));
    assert!(
        outcome.logical_form.contains("_RUNWAY_(*27L*)"),
        "got {}",
        outcome.logical_form
    );
}

#[test]
fn integer_spans_past_the_cap_are_elided() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("squawk 1 2 3 4 5 6 7 8 9 10", 3);
    assert!(outcome.overflows >= 1);
    // The parse still succeeds on the surviving placeholders.
    assert!(outcome.logical_form.contains("_SQUAWK_(*squawk*)"));
    assert!(outcome.logical_form.contains("_INTNUMBER_(*9*)"));
    assert!(!outcome.logical_form.contains("*10*"));
}

#[test]
fn unknown_spans_surface_as_context_literals() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("roger abracadabra wilco xyzzy", 1);
    assert_eq!(
        outcome.logical_form,
        "_ACKNOWLEDGE_(*roger*); _context_(*abracadabra*); _ACKNOWLEDGE_(*wilco*); _context_(*xyzzy*); "
    );
    let value: serde_json::Value = serde_json::from_str(&outcome.json_form).unwrap();
    assert_eq!(value["context_1"], "abracadabra");
    assert_eq!(value["context_2"], "xyzzy");
}

#[test]
fn conjunction_uses_the_and_head() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("squawk 1200 and 1300", 1);
    assert_eq!(
        outcome.logical_form,
        "_SQUAWK_(_SQUAWK_(*squawk*),_INTNUMBER_(*1200*)); _AND_(_INTNUMBER_(*1300*)); "
    );
}

#[test]
fn prepositions_wrap_their_argument() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("cleared to the Atlanta", 1);
    assert_eq!(
        outcome.logical_form,
        "_CLEARED_(_CLEARED_(*cleared*),_TO_(*to*),_the_(_PLACE_(*Atlanta*))); "
    );
}

#[test]
fn empty_input_gives_an_empty_form() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("", 3);
    assert_eq!(outcome.logical_form, "");
    assert_eq!(outcome.json_form, "{}");
    // A lone unknown still surfaces, as a context literal.
    let outcome = parser.parse("zzzzqq", 3);
    assert_eq!(outcome.json_form, r#"{"context_1":"zzzzqq"}"#);
}

#[test]
fn results_row_is_tab_separated() {
    let parser = atc_parser().unwrap();
    let outcome = parser.parse("roger", 2);
    assert_eq!(
        outcome.tsv_row(7, "roger"),
        format!("7\troger\t{}", outcome.json_form)
    );
}
