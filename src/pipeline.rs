//! The pipeline controller: resource loading, lexicon synthesis, and the stepped
//! parse-refine loop over one utterance.

use crate::abstraction::{lf_to_placeholders, replace_unknown_spans, text_to_placeholders};
use crate::json::project_json;
use crate::normalize::normalize;
use crate::resource::parse_prepositions;
use crate::segment::drive;
use crate::{
    CategoryFilter, CcgParser, ComplexRuleSet, Lexicon, Log, ParseOutcome, PlaceholderRegistry,
    RegexTable, ReplacementMap, ResourceError, SemanticParser, StepTrace,
};
use once_cell::unsync::OnceCell;
use std::rc::Rc;

impl SemanticParser {
    /// Build the full pipeline from the four resource texts.
    ///
    /// Two lexicons are synthesised: the unfiltered one used by stage 0 on English text, and
    /// the filtered one used by refinement stages on placeholder streams derived from
    /// logical forms. All resulting state is immutable.
    pub fn new(
        regex_text: &str,
        prepositions_text: &str,
        category_filters_text: &str,
        lex_complex_text: &str,
    ) -> Result<Self, ResourceError> {
        let table = RegexTable::parse(regex_text)?;
        let registry = PlaceholderRegistry::new(&table);
        let prepositions = parse_prepositions(prepositions_text);
        let filter = CategoryFilter::parse(category_filters_text, &table)?;

        let complex_all = ComplexRuleSet::parse(lex_complex_text, None)?;
        let complex_filtered = ComplexRuleSet::parse(lex_complex_text, Some(&filter))?;

        let lexicon_full = Rc::new(Lexicon::synthesise(
            &table,
            &registry,
            &prepositions,
            &complex_all,
        )?);
        let lexicon_filtered = Rc::new(Lexicon::synthesise(
            &table,
            &registry,
            &prepositions,
            &complex_filtered,
        )?);

        Ok(Self {
            parser_full: CcgParser::new(lexicon_full.clone()),
            parser_filtered: CcgParser::new(lexicon_filtered.clone()),
            table,
            registry,
            prepositions,
            lexicon_full,
            lexicon_filtered,
            log: OnceCell::new(),
        })
    }

    /// Set a log label to debug the per-step placeholder streams.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// The stage-0 lexicon.
    pub fn full_lexicon(&self) -> &Lexicon {
        &self.lexicon_full
    }

    /// The lexicon used by refinement stages.
    pub fn filtered_lexicon(&self) -> &Lexicon {
        &self.lexicon_filtered
    }

    pub fn prepositions(&self) -> &[String] {
        &self.prepositions
    }

    pub fn registry(&self) -> &PlaceholderRegistry {
        &self.registry
    }

    /// Parse one utterance through at most `number_of_steps` stages, stopping early once a
    /// stage reproduces the previous logical form.
    pub fn parse(&self, utterance: &str, number_of_steps: usize) -> ParseOutcome {
        self.run(utterance, number_of_steps, None)
    }

    /// Like [parse](Self::parse) but also records each stage's placeholder stream and
    /// logical form, without altering the outcome.
    pub fn parse_debug(&self, utterance: &str, number_of_steps: usize) -> (ParseOutcome, Vec<StepTrace>) {
        let mut steps = Vec::new();
        let outcome = self.run(utterance, number_of_steps, Some(&mut steps));
        (outcome, steps)
    }

    fn run(
        &self,
        utterance: &str,
        number_of_steps: usize,
        mut trace: Option<&mut Vec<StepTrace>>,
    ) -> ParseOutcome {
        let normalized = normalize(utterance);
        let mut lf_prev = String::new();
        let mut overflows = 0;

        for step in 0..number_of_steps {
            let mut map = ReplacementMap::new();
            let stream = if step == 0 {
                let buffer =
                    text_to_placeholders(&self.table, &self.registry, &mut map, &normalized);
                replace_unknown_spans(&buffer, self.lexicon_full.words(), &mut map)
            } else {
                lf_to_placeholders(&lf_prev, &self.registry, &mut map)
            };
            overflows += map.overflows();

            #[cfg(debug_assertions)]
            if let Some(log) = self.log.get() {
                if log.covers(&Log::Default(())) {
                    println!("[{}] step {} placeholders: {}", log, step, stream);
                }
            }

            let parser = if step == 0 {
                &self.parser_full
            } else {
                &self.parser_filtered
            };
            let lf = drive(parser, &stream, &map, step);

            if let Some(steps) = trace.as_mut() {
                steps.push(StepTrace {
                    step,
                    placeholders: stream,
                    logical_form: lf.clone(),
                });
            }
            if lf == lf_prev {
                break;
            }
            lf_prev = lf;
        }

        ParseOutcome {
            json_form: project_json(&lf_prev),
            logical_form: lf_prev,
            overflows,
        }
    }
}

impl ParseOutcome {
    /// The persisted results row: `index \t original_command \t json_form`.
    pub fn tsv_row(&self, index: usize, original_command: &str) -> String {
        format!("{}\t{}\t{}", index, original_command, self.json_form)
    }
}
