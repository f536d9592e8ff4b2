//! Utterance normalisation applied once before lexical abstraction.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bre-([a-z])").unwrap());
static LETTER_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])-([a-zA-Z])").unwrap());
static DIGIT_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)-(\d)\b").unwrap());

/// Normalise a raw utterance: fold `re-` forms, resolve hyphens, replace separators,
/// expand contractions and strip trailing punctuation.
pub fn normalize(command: &str) -> String {
    let mut command = RE_PREFIX.replace_all(command, "re$1").to_string();

    // Intra-word hyphens between letters become a space; the hyphen inside digit-digit
    // forms is dropped. Repeat until stable so chains like "x-y-z" resolve fully.
    loop {
        let next = LETTER_HYPHEN.replace_all(&command, "$1 $2").to_string();
        if next == command {
            break;
        }
        command = next;
    }
    command = DIGIT_HYPHEN.replace_all(&command, "$1$2").to_string();

    let command = command
        .replace("; ", " ")
        .replace(": ", " ")
        .replace(", ", " ")
        .replace(". ", " ")
        .replace("? ", " ")
        .replace('—', " ")
        .replace('-', " ")
        .replace('=', "-")
        .replace('’', "'")
        .replace("O'", "O")
        .replace(',', "")
        .replace("I'd", "i would")
        .replace("it's", "it is")
        .replace("what's", "what is")
        .replace("that's", "that is")
        .replace("'s", "")
        .replace("'ve", " have")
        .replace("'ll", " will")
        .replace("'re", " are")
        .replace(" a ", " ")
        .replace('+', "");

    command
        .trim_matches(|c| matches!(c, '.' | ',' | '?' | '!' | '\n' | '”' | '"'))
        .to_string()
}
