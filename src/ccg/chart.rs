use super::semantics::{apply, compose};
use crate::{CcgParser, Combinator, Lexicon, Log, SemTerm, SynCat};
use once_cell::unsync::OnceCell;
use ptree::TreeItem;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone)]
/// One node of a CCG derivation: its category, its semantics, and how it was built.
pub struct Derivation {
    pub syn: SynCat,
    pub sem: SemTerm,
    /// Surface token for lexical leaves.
    pub token: Option<String>,
    /// Rule used to combine the two children; [None] for leaves.
    pub rule: Option<Combinator>,
    pub children: Vec<Rc<Derivation>>,
}

impl Derivation {
    fn leaf(token: &str, syn: SynCat, sem: SemTerm) -> Self {
        Self {
            syn,
            sem,
            token: Some(token.to_string()),
            rule: None,
            children: Vec::new(),
        }
    }

    fn branch(rule: Combinator, syn: SynCat, sem: SemTerm, left: &Rc<Derivation>, right: &Rc<Derivation>) -> Self {
        Self {
            syn,
            sem,
            token: None,
            rule: Some(rule),
            children: vec![left.clone(), right.clone()],
        }
    }

    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl TreeItem for Derivation {
    type Child = Derivation;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match (&self.token, &self.rule) {
            (Some(token), _) => write!(f, "{} => {} {{{}}}", token, self.syn, self.sem),
            (None, Some(rule)) => write!(f, "{:?}: {} {{{}}}", rule, self.syn, self.sem),
            (None, None) => write!(f, "{} {{{}}}", self.syn, self.sem),
        }
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::Owned(self.children.iter().map(|c| (**c).clone()).collect())
    }
}

impl CcgParser {
    /// Build a chart parser over the lexicon applying the Application and Composition rule
    /// sets in a fixed order. The rule order, together with the span/split/edge enumeration
    /// order of the chart, makes the first returned derivation stable across runs.
    pub fn new(lexicon: Rc<Lexicon>) -> Self {
        Self {
            lexicon,
            rules: vec![
                Combinator::ForwardApplication,
                Combinator::BackwardApplication,
                Combinator::ForwardComposition,
                Combinator::BackwardComposition,
            ],
            log: OnceCell::new(),
        }
    }

    /// Set a log label to debug chart activity.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn lexicon(&self) -> &Rc<Lexicon> {
        &self.lexicon
    }

    /// Parse a token sequence and return every derivation of the start category spanning the
    /// whole input, in chart insertion order. An unknown token yields no derivations.
    pub fn parse(&self, tokens: &[&str]) -> Vec<Rc<Derivation>> {
        let n = tokens.len();
        if n == 0 {
            return Vec::new();
        }
        let start = match self.lexicon.start() {
            Some(start) => SynCat::Atom(start.to_string()),
            None => return Vec::new(),
        };

        // chart[start][end - start - 1] holds every edge spanning [start, end).
        let mut chart: Vec<Vec<Vec<Rc<Derivation>>>> = vec![vec![Vec::new(); n]; n];
        let mut seen: Vec<Vec<HashSet<(SynCat, SemTerm)>>> = vec![vec![HashSet::new(); n]; n];

        for (i, token) in tokens.iter().enumerate() {
            for entry in self.lexicon.entries_for(token) {
                let edge = Rc::new(Derivation::leaf(token, entry.syn.clone(), entry.sem.clone()));
                if seen[i][0].insert((entry.syn.clone(), entry.sem.clone())) {
                    chart[i][0].push(edge);
                }
            }
            #[cfg(debug_assertions)]
            if let Some(log) = self.log.get() {
                if log.covers(&Log::Verbose(())) {
                    println!("[{}] lexical '{}': {} edges", log, token, chart[i][0].len());
                }
            }
        }

        for len in 2..=n {
            for begin in 0..=(n - len) {
                for split in (begin + 1)..(begin + len) {
                    let (left_cells, right_cells) = chart.split_at(split);
                    let left_edges = &left_cells[begin][split - begin - 1];
                    let right_edges = &right_cells[0][begin + len - split - 1];
                    let mut created: Vec<Rc<Derivation>> = Vec::new();
                    for left in left_edges {
                        for right in right_edges {
                            for rule in &self.rules {
                                if let Some((syn, sem)) = combine(*rule, left, right) {
                                    created.push(Rc::new(Derivation::branch(
                                        *rule, syn, sem, left, right,
                                    )));
                                }
                            }
                        }
                    }
                    for edge in created {
                        if seen[begin][len - 1].insert((edge.syn.clone(), edge.sem.clone())) {
                            chart[begin][len - 1].push(edge);
                        }
                    }
                }
            }
        }

        let parses: Vec<Rc<Derivation>> = chart[0][n - 1]
            .iter()
            .filter(|edge| edge.syn == start)
            .cloned()
            .collect();

        #[cfg(debug_assertions)]
        if let Some(log) = self.log.get() {
            if log.covers(&Log::Result(())) {
                println!("[{}] '{}': {} parses", log, tokens.join(" "), parses.len());
            }
        }
        parses
    }
}

/// Apply one combination rule to two adjacent edges.
fn combine(rule: Combinator, left: &Derivation, right: &Derivation) -> Option<(SynCat, SemTerm)> {
    match rule {
        Combinator::ForwardApplication => match &left.syn {
            SynCat::Forward(res, arg) if **arg == right.syn => {
                Some(((**res).clone(), apply(&left.sem, &right.sem)))
            }
            _ => None,
        },
        Combinator::BackwardApplication => match &right.syn {
            SynCat::Backward(res, arg) if **arg == left.syn => {
                Some(((**res).clone(), apply(&right.sem, &left.sem)))
            }
            _ => None,
        },
        Combinator::ForwardComposition => match (&left.syn, &right.syn) {
            (SynCat::Forward(x, y1), SynCat::Forward(y2, z)) if y1 == y2 => Some((
                SynCat::Forward(x.clone(), z.clone()),
                compose(&left.sem, &right.sem),
            )),
            _ => None,
        },
        Combinator::BackwardComposition => match (&left.syn, &right.syn) {
            (SynCat::Backward(y2, z), SynCat::Backward(x, y1)) if y1 == y2 => Some((
                SynCat::Backward(x.clone(), z.clone()),
                compose(&right.sem, &left.sem),
            )),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexicon;

    fn lexicon(text: &str) -> Rc<Lexicon> {
        Rc::new(Lexicon::from_text(text).unwrap())
    }

    #[test]
    fn forward_application_yields_start_parses() {
        let lex = lexicon(
            ":- S,ACKNOWLEDGE\n\
             _context_ => S/ACKNOWLEDGE {\\z._context_(z)}\n\
             acknowledge1 => ACKNOWLEDGE {_ACKNOWLEDGE_(acknowledge1)}\n",
        );
        let parser = CcgParser::new(lex);
        let parses = parser.parse(&["_context_", "acknowledge1"]);
        assert_eq!(parses.len(), 1);
        assert_eq!(
            parses[0].sem.to_string(),
            "_context_(_ACKNOWLEDGE_(acknowledge1))"
        );
    }

    #[test]
    fn nested_application_orders_arguments() {
        let lex = lexicon(
            ":- S,CLEARED,TO,PLACE\n\
             _context_ => S/CLEARED {\\z._context_(z)}\n\
             cleared1 => (CLEARED/PLACE)/TO {\\x y._CLEARED_(_CLEARED_(cleared1),x,y)}\n\
             to1 => TO {_TO_(to1)}\n\
             place1 => PLACE {_PLACE_(place1)}\n",
        );
        let parser = CcgParser::new(lex);
        let parses = parser.parse(&["_context_", "cleared1", "to1", "place1"]);
        assert_eq!(parses.len(), 1);
        assert_eq!(
            parses[0].sem.to_string(),
            "_context_(_CLEARED_(_CLEARED_(cleared1),_TO_(to1),_PLACE_(place1)))"
        );
    }

    #[test]
    fn unknown_tokens_produce_no_parse() {
        let lex = lexicon(":- S,NP\nno => S/NP {\\z._no_(z)}\n");
        let parser = CcgParser::new(lex);
        assert!(parser.parse(&["no", "mystery1"]).is_empty());
    }

    #[test]
    fn repeated_parses_are_identical() {
        let lex = lexicon(
            ":- S,TRAFFIC,NP\n\
             no => S/NP {\\z._no_(z)}\n\
             traffic1 => NP {_TRAFFIC_(traffic1)}\n\
             traffic1 => TRAFFIC {_TRAFFIC_(traffic1)}\n",
        );
        let parser = CcgParser::new(lex);
        let first: Vec<String> = parser
            .parse(&["no", "traffic1"])
            .iter()
            .map(|d| d.sem.to_string())
            .collect();
        let second: Vec<String> = parser
            .parse(&["no", "traffic1"])
            .iter()
            .map(|d| d.sem.to_string())
            .collect();
        assert_eq!(first, vec!["_no_(_TRAFFIC_(traffic1))".to_string()]);
        assert_eq!(first, second);
    }
}
