use crate::{ResourceError, SynCat};
use std::fmt::{Display, Formatter};

impl SynCat {
    /// Parse a syntactic category written with the standard CCG slash operators, e.g.
    /// `(S/S)/NP`. Slashes associate to the left. Every primitive must be declared.
    pub fn parse(text: &str, primitives: &[String]) -> Result<Self, ResourceError> {
        let mut parser = CatParser {
            chars: text.trim().char_indices().collect(),
            at: 0,
            text,
            primitives,
        };
        let cat = parser.expression()?;
        if parser.at != parser.chars.len() {
            return Err(parser.error("trailing input after category"));
        }
        Ok(cat)
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, SynCat::Atom(_))
    }
}

impl Display for SynCat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn child(cat: &SynCat, f: &mut Formatter<'_>) -> std::fmt::Result {
            if cat.is_atom() {
                write!(f, "{}", cat)
            } else {
                write!(f, "({})", cat)
            }
        }
        match self {
            SynCat::Atom(name) => write!(f, "{}", name),
            SynCat::Forward(res, arg) => {
                child(res, f)?;
                write!(f, "/")?;
                child(arg, f)
            }
            SynCat::Backward(res, arg) => {
                child(res, f)?;
                write!(f, "\\")?;
                child(arg, f)
            }
        }
    }
}

struct CatParser<'t> {
    chars: Vec<(usize, char)>,
    at: usize,
    text: &'t str,
    primitives: &'t [String],
}

impl<'t> CatParser<'t> {
    fn error(&self, message: &str) -> ResourceError {
        ResourceError::new(
            "SynCat".to_string(),
            format!("{} in '{}'", message, self.text.trim()),
        )
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.at).map(|(_, c)| *c)
    }

    fn expression(&mut self) -> Result<SynCat, ResourceError> {
        let mut left = self.part()?;
        while let Some(op) = self.peek() {
            match op {
                '/' => {
                    self.at += 1;
                    let right = self.part()?;
                    left = SynCat::Forward(Box::new(left), Box::new(right));
                }
                '\\' => {
                    self.at += 1;
                    let right = self.part()?;
                    left = SynCat::Backward(Box::new(left), Box::new(right));
                }
                ')' => break,
                _ => return Err(self.error("unexpected operator")),
            }
        }
        Ok(left)
    }

    fn part(&mut self) -> Result<SynCat, ResourceError> {
        match self.peek() {
            Some('(') => {
                self.at += 1;
                let inner = self.expression()?;
                if self.peek() != Some(')') {
                    return Err(self.error("missing closing parenthesis"));
                }
                self.at += 1;
                Ok(inner)
            }
            Some(c) if c.is_alphanumeric() || c == '_' => {
                let start = self.at;
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                    self.at += 1;
                }
                let name: String = self.chars[start..self.at].iter().map(|(_, c)| c).collect();
                if !self.primitives.iter().any(|p| p == &name) {
                    return Err(self.error(&format!("undeclared category '{}'", name)));
                }
                Ok(SynCat::Atom(name))
            }
            _ => Err(self.error("expected category")),
        }
    }
}
