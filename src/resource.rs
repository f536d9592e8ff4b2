use crate::{CategoryFilter, ComplexRuleSet, RegexEntry, RegexTable, ResourceError};
use regex::RegexBuilder;

impl RegexTable {
    /// Parse the regex resource: `#CATEGORY` headers open a section, subsequent non-empty
    /// lines are patterns written as `r"…"`. Patterns are lowercased and compiled with
    /// case-insensitive matching. A pattern repeated anywhere in the resource is an error.
    pub fn parse(text: &str) -> Result<Self, ResourceError> {
        let mut category = String::new();
        let mut entries: Vec<RegexEntry> = Vec::new();
        let mut categories: Vec<String> = Vec::new();

        for record in text.lines() {
            if record.starts_with('#') {
                category = record.trim_matches(|c| c == ' ' || c == '#').to_uppercase();
                continue;
            }
            let source = record.trim().replace("r\"", "").replace('"', "").to_lowercase();
            if source.is_empty() {
                continue;
            }
            if category.is_empty() {
                return Err(ResourceError::new(
                    "RegexTable".to_string(),
                    format!("Pattern '{}' appears before any category header.", source),
                ));
            }
            if entries.iter().any(|e| e.source == source) {
                return Err(ResourceError::new(
                    "RegexTable".to_string(),
                    format!("Pattern '{}' is mapped more than once.", source),
                ));
            }
            let regex = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|err| {
                    ResourceError::new(
                        "RegexTable".to_string(),
                        format!("Pattern '{}' is not a valid regex. {}", source, err),
                    )
                })?;
            if regex.is_match("") {
                return Err(ResourceError::new(
                    "RegexTable".to_string(),
                    format!("Pattern '{}' should not be nullable.", source),
                ));
            }
            if !categories.iter().any(|c| c == &category) {
                categories.push(category.clone());
            }
            entries.push(RegexEntry {
                category: category.clone(),
                complexity: complexity_of(&source),
                source,
                regex,
            });
        }

        let mut priority: Vec<usize> = (0..entries.len()).collect();
        priority.sort_by(|a, b| entries[*b].complexity.cmp(&entries[*a].complexity));

        Ok(Self {
            entries,
            priority,
            categories,
        })
    }

    /// Categories in first-appearance order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Entries in descending complexity, ties in resource order.
    pub fn entries_by_priority(&self) -> impl Iterator<Item = &RegexEntry> {
        self.priority.iter().map(move |i| &self.entries[*i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RegexEntry {
    /// First matched span in the haystack, localised to capture group 1 when the pattern
    /// defines capture groups.
    pub fn first_span(&self, haystack: &str) -> Option<(usize, usize)> {
        for caps in self.regex.captures_iter(haystack) {
            let group = if caps.len() > 1 { caps.get(1) } else { caps.get(0) };
            if let Some(m) = group {
                return Some((m.start(), m.end()));
            }
        }
        None
    }
}

/// Priority key of a pattern: the number of backslash separated fragments once
/// non-capturing and assertion groups `(?…)` are stripped.
fn complexity_of(pattern: &str) -> usize {
    // The `(?…)` stripper does not need to understand nesting; the source patterns never nest
    // assertion groups.
    let stripped = strip_special_groups(pattern);
    stripped.split('\\').count()
}

fn strip_special_groups(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'(' && i + 1 < bytes.len() && bytes[i + 1] == b'?' {
            match bytes[i..].iter().position(|b| *b == b')') {
                Some(close) => {
                    i += close + 1;
                    continue;
                }
                None => break,
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Read the preposition resource: one token per line, `#` opens a comment line.
pub fn parse_prepositions(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect()
}

impl CategoryFilter {
    /// Parse the category filter: one upper-cased category per line, `-` skips the line.
    /// Every named category must exist in the regex table.
    pub fn parse(text: &str, table: &RegexTable) -> Result<Self, ResourceError> {
        let mut names = Vec::new();
        for record in text.lines() {
            let record = record.trim();
            if record.is_empty() || record.starts_with('-') {
                continue;
            }
            let name = record.to_uppercase();
            if !table.categories().iter().any(|c| c == &name) {
                return Err(ResourceError::new(
                    "CategoryFilter".to_string(),
                    format!("Filter names unknown category '{}'.", name),
                ));
            }
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(Self { names })
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether a complex rule body is admitted: its text must contain `/x ` for one of the
    /// filter categories x, compared case-insensitively.
    pub fn admits(&self, rule: &str) -> bool {
        let lowered = rule.to_lowercase();
        self.names
            .iter()
            .any(|name| lowered.contains(&format!("/{} ", name.to_lowercase())))
    }
}

impl ComplexRuleSet {
    /// Parse the complex rule resource: `#CATEGORY` sections of CCG rule bodies written
    /// against the category's first placeholder. Lines starting with `-` are skipped and the
    /// escape `\\` is normalised to `\`. With a non-empty filter only admitted entries are kept.
    pub fn parse(text: &str, filter: Option<&CategoryFilter>) -> Result<Self, ResourceError> {
        let mut sections: Vec<(String, Vec<String>)> = Vec::new();

        for record in text.lines() {
            if record.trim().is_empty() {
                continue;
            }
            if record.starts_with('#') {
                let category = record.trim_matches(|c| c == ' ' || c == '#').to_uppercase();
                sections.push((category, Vec::new()));
                continue;
            }
            if record.starts_with('-') {
                continue;
            }
            let entry = record.trim().replace("\\\\", "\\");
            if entry.matches('{').count() != entry.matches('}').count()
                || !entry.contains('{')
            {
                return Err(ResourceError::new(
                    "ComplexRuleSet".to_string(),
                    format!("Rule '{}' has unbalanced semantics braces.", entry),
                ));
            }
            let section = sections.last_mut().ok_or_else(|| {
                ResourceError::new(
                    "ComplexRuleSet".to_string(),
                    format!("Rule '{}' appears before any category header.", entry),
                )
            })?;
            match filter {
                Some(f) if !f.is_empty() => {
                    if f.admits(&entry) {
                        section.1.push(entry);
                    }
                }
                _ => section.1.push(entry),
            }
        }
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[(String, Vec<String>)] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
#CALLSIGN
r"\bswa\d+\b"
r"\b(november)\s+(?:zero|one|two)"

#INTNUMBER
r"\b\d+\b"
"#;

    #[test]
    fn regex_table_sections() {
        let table = RegexTable::parse(TABLE).unwrap();
        assert_eq!(table.categories(), &["CALLSIGN", "INTNUMBER"]);
        assert_eq!(table.len(), 3);
        // The callsign pattern has the highest fragment count and must be tried first;
        // the november pattern drops to the back once its `(?:…)` group is stripped.
        let first = table.entries_by_priority().next().unwrap();
        assert!(first.source.starts_with(r"\bswa"));
        let last = table.entries_by_priority().last().unwrap();
        assert!(last.source.starts_with(r"\b(november)"));
    }

    #[test]
    fn complexity_ignores_special_groups() {
        assert_eq!(complexity_of(r"\b(november)\s+(?:zero|one|two)"), 3);
        assert_eq!(complexity_of(r"\bswa\d+\b"), 4);
    }

    #[test]
    fn duplicate_pattern_is_an_error() {
        let bad = "#A\nr\"\\bx\\b\"\n#B\nr\"\\bx\\b\"\n";
        assert!(RegexTable::parse(bad).is_err());
    }

    #[test]
    fn filter_requires_known_categories() {
        let table = RegexTable::parse(TABLE).unwrap();
        assert!(CategoryFilter::parse("CALLSIGN\n-SKIPPED\n", &table).is_ok());
        assert!(CategoryFilter::parse("NOSUCH\n", &table).is_err());
    }

    #[test]
    fn complex_rules_respect_filter() {
        let table = RegexTable::parse(TABLE).unwrap();
        let filter = CategoryFilter::parse("INTNUMBER\n", &table).unwrap();
        let text = "#CALLSIGN\nCALLSIGN/INTNUMBER {\\x._CALLSIGN_(_CALLSIGN_(callsign1),x)}\nCALLSIGN/WORDNUMBER {\\x._CALLSIGN_(_CALLSIGN_(callsign1),x)}\n";
        let unfiltered = ComplexRuleSet::parse(text, None).unwrap();
        assert_eq!(unfiltered.sections()[0].1.len(), 2);
        let filtered = ComplexRuleSet::parse(text, Some(&filter)).unwrap();
        assert_eq!(filtered.sections()[0].1.len(), 1);
        assert!(filtered.sections()[0].1[0].contains("INTNUMBER"));
    }
}
