use crate::{
    ComplexRuleSet, LexEntry, Lexicon, PlaceholderRegistry, RegexTable, ResourceError, SemTerm,
    SynCat, UNKNOWN_SLOTS,
};
use once_cell::unsync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Primitive categories common to every lexicon, declared ahead of the table categories.
const BASELINE_CATEGORIES: &str = "S,NP,N,ADJ,VP,PP,P,JJ,JJR,DT,PPN,NNP";

impl Lexicon {
    /// Synthesise the canonical textual lexicon and compile it.
    ///
    /// Sections, in order: the categories declaration, the `_context_`/`no`/`and` control
    /// rules, one simple rule per placeholder, the complex rules expanded per placeholder of
    /// their section category, the preposition rules, and the `X1..X12 => CONTEXT` slots.
    pub fn synthesise(
        table: &RegexTable,
        registry: &PlaceholderRegistry,
        prepositions: &[String],
        complex: &ComplexRuleSet,
    ) -> Result<Self, ResourceError> {
        let mut sorted_categories: Vec<&String> = table.categories().iter().collect();
        sorted_categories.sort();

        let mut text = String::new();

        // Categories declaration. CONTEXT is reserved for the unknown slots and is declared
        // even when the regex table does not define it.
        write!(text, ":- {}", BASELINE_CATEGORIES).unwrap();
        for category in &sorted_categories {
            write!(text, ",{}", category).unwrap();
        }
        if !table.categories().iter().any(|c| c == "CONTEXT") {
            write!(text, ",CONTEXT").unwrap();
        }
        text.push('\n');

        // Common control rules.
        text.push_str("\n_context_ => (S/S)/NP {\\x y._context_(x,y)}\n");
        text.push_str("_context_ => (S/NP)/S {\\y x._context_(x,y)}\n");
        text.push_str("_context_ => S/NP {\\z._context_(z)}\n");
        text.push_str("\nno => S/NP {\\z._no_(z)}\n");
        text.push_str("no => S/S {\\z._no_(z)}\n");
        for category in &sorted_categories {
            write!(
                text,
                "\n_context_ => (S/S)/{0} {{\\x y._context_(x,y)}}\n\
                 _context_ => (S/{0})/S {{\\y x._context_(x,y)}}\n\
                 _context_ => S/{0} {{\\z._context_(z)}}\n",
                category
            )
            .unwrap();
            writeln!(text, "and => {0}/{0} {{\\x._AND_(x)}}", category).unwrap();
        }

        // Simple category rules.
        for (category, pool) in registry.pools() {
            for placeholder in pool {
                writeln!(
                    text,
                    "{} => {} {{_{}_({})}}",
                    placeholder, category, category, placeholder
                )
                .unwrap();
            }
        }

        // Complex rules, written against the first placeholder of their section category and
        // repeated for every placeholder of the pool.
        for (category, rules) in complex.sections() {
            let pool = registry.placeholders(category).ok_or_else(|| {
                ResourceError::new(
                    "Lexicon".to_string(),
                    format!("Complex rule section for unknown category '{}'.", category),
                )
            })?;
            let first = format!("{}1", category.to_lowercase());
            for rule in rules {
                for placeholder in pool {
                    writeln!(text, "{} => {}", placeholder, rule.replace(&first, placeholder))
                        .unwrap();
                }
            }
        }

        // Preposition rules.
        for (category, _) in registry.pools() {
            for preposition in prepositions {
                writeln!(
                    text,
                    "{0} => {1}/{1} {{\\x._{0}_(x)}}",
                    preposition, category
                )
                .unwrap();
            }
        }
        for preposition in prepositions {
            writeln!(text, "{0} => NP/NP {{\\x._{0}_(x)}}", preposition).unwrap();
        }

        // Unknown-slot rules.
        for i in 1..=UNKNOWN_SLOTS {
            writeln!(text, "X{0} => CONTEXT {{X{0}}}", i).unwrap();
        }

        Self::from_text(&text)
    }

    /// Compile a textual lexicon: a `:- C1,C2,…` declaration line followed by
    /// `token => SYNCAT {SEM}` entries.
    pub fn from_text(text: &str) -> Result<Self, ResourceError> {
        let mut primitives: Vec<String> = Vec::new();
        let mut entries: Vec<LexEntry> = Vec::new();
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();

        for record in text.lines() {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }
            if let Some(declaration) = record.strip_prefix(":-") {
                for name in declaration.split(',') {
                    let name = name.trim().to_string();
                    if !name.is_empty() && !primitives.contains(&name) {
                        primitives.push(name);
                    }
                }
                continue;
            }
            let (token, rest) = record.split_once("=>").ok_or_else(|| {
                ResourceError::new(
                    "Lexicon".to_string(),
                    format!("Entry '{}' is missing '=>'.", record),
                )
            })?;
            let token = token.trim().to_string();
            let rest = rest.trim();
            let brace = rest.find('{').ok_or_else(|| {
                ResourceError::new(
                    "Lexicon".to_string(),
                    format!("Entry '{}' is missing its semantics.", record),
                )
            })?;
            let close = rest.rfind('}').ok_or_else(|| {
                ResourceError::new(
                    "Lexicon".to_string(),
                    format!("Entry '{}' has unbalanced semantics braces.", record),
                )
            })?;
            if primitives.is_empty() {
                return Err(ResourceError::new(
                    "Lexicon".to_string(),
                    "The categories declaration must precede the first entry.".to_string(),
                ));
            }
            let syn = SynCat::parse(&rest[..brace], &primitives)?;
            let sem = SemTerm::parse(&rest[brace + 1..close])?;
            index.entry(token.clone()).or_default().push(entries.len());
            entries.push(LexEntry { token, syn, sem });
        }

        Ok(Self {
            text: text.to_string(),
            primitives,
            entries,
            index,
            words: OnceCell::new(),
        })
    }

    /// The canonical textual form this lexicon was compiled from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The start category of the grammar: the first declared primitive.
    pub fn start(&self) -> Option<&str> {
        self.primitives.first().map(|s| s.as_str())
    }

    pub fn entries(&self) -> &[LexEntry] {
        &self.entries
    }

    /// Entries for a surface token, in lexicon order.
    pub fn entries_for(&self, token: &str) -> impl Iterator<Item = &LexEntry> {
        self.index
            .get(token)
            .into_iter()
            .flatten()
            .map(move |i| &self.entries[*i])
    }

    /// The set of surface tokens appearing on the left-hand side of any rule.
    /// Used by the unknown-span finder to decide which tokens are already covered.
    pub fn words(&self) -> &HashSet<String> {
        self.words
            .get_or_init(|| self.entries.iter().map(|e| e.token.clone()).collect())
    }
}
