use crate::{ResourceError, SemTerm};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

impl SemTerm {
    /// Parse a semantic rule body, e.g. `\x y._CLEARED_(_CLEARED_(cleared1),x,y)` or a bare
    /// term such as `_CALLSIGN_(callsign1)`. Names bound by the lambda prefix become
    /// [SemTerm::Var]; every other symbol is a constant.
    pub fn parse(text: &str) -> Result<Self, ResourceError> {
        let trimmed = text.trim();
        let (params, body) = match trimmed.strip_prefix('\\') {
            Some(rest) => {
                let dot = rest.find('.').ok_or_else(|| {
                    ResourceError::new(
                        "SemTerm".to_string(),
                        format!("Lambda without body separator in '{}'", trimmed),
                    )
                })?;
                let params: Vec<String> =
                    rest[..dot].split_whitespace().map(|s| s.to_string()).collect();
                if params.is_empty() {
                    return Err(ResourceError::new(
                        "SemTerm".to_string(),
                        format!("Lambda without parameters in '{}'", trimmed),
                    ));
                }
                (params, rest[dot + 1..].trim())
            }
            None => (Vec::new(), trimmed),
        };

        let mut parser = TermParser {
            rest: body,
            full: trimmed,
            params: &params,
        };
        let term = parser.term()?;
        if !parser.rest.trim().is_empty() {
            return Err(parser.error("trailing input after term"));
        }
        if params.is_empty() {
            Ok(term)
        } else {
            Ok(SemTerm::Lambda(params, Box::new(term)))
        }
    }

    /// All variable and constant names occurring in the term.
    pub fn names(&self, into: &mut HashSet<String>) {
        match self {
            SemTerm::Var(n) | SemTerm::Const(n) => {
                into.insert(n.clone());
            }
            SemTerm::Apply(head, args) => {
                head.names(into);
                for arg in args {
                    arg.names(into);
                }
            }
            SemTerm::Lambda(params, body) => {
                for p in params {
                    into.insert(p.clone());
                }
                body.names(into);
            }
        }
    }
}

impl Display for SemTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SemTerm::Var(n) | SemTerm::Const(n) => write!(f, "{}", n),
            SemTerm::Apply(head, args) => {
                write!(f, "{}(", head)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            SemTerm::Lambda(params, body) => {
                write!(f, "\\{}.{}", params.join(" "), body)
            }
        }
    }
}

/// Function application with beta reduction.
///
/// Applying a lambda substitutes its first parameter; a partial application keeps the
/// remaining parameters bound. Applying a non-lambda flattens into `f(a,b,…)` so that nested
/// applications print in the logical-form shape.
pub fn apply(f: &SemTerm, arg: &SemTerm) -> SemTerm {
    match f {
        SemTerm::Lambda(params, body) => {
            let reduced = substitute(body, &params[0], arg);
            if params.len() > 1 {
                SemTerm::Lambda(params[1..].to_vec(), Box::new(reduced))
            } else {
                reduced
            }
        }
        SemTerm::Apply(head, args) => {
            let mut extended = args.clone();
            extended.push(arg.clone());
            SemTerm::Apply(head.clone(), extended)
        }
        other => SemTerm::Apply(Box::new(other.clone()), vec![arg.clone()]),
    }
}

/// Function composition `\z.f(g(z))` with a variable fresh for both operands.
pub fn compose(f: &SemTerm, g: &SemTerm) -> SemTerm {
    let mut used = HashSet::new();
    f.names(&mut used);
    g.names(&mut used);
    let fresh = fresh_var(&used);
    let var = SemTerm::Var(fresh.clone());
    let body = apply(f, &apply(g, &var));
    SemTerm::Lambda(vec![fresh], Box::new(body))
}

fn fresh_var(used: &HashSet<String>) -> String {
    if !used.contains("z") {
        return "z".to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("z{}", i);
        if !used.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

fn substitute(term: &SemTerm, var: &str, value: &SemTerm) -> SemTerm {
    match term {
        SemTerm::Var(n) if n == var => value.clone(),
        SemTerm::Var(_) | SemTerm::Const(_) => term.clone(),
        SemTerm::Apply(head, args) => SemTerm::Apply(
            Box::new(substitute(head, var, value)),
            args.iter().map(|a| substitute(a, var, value)).collect(),
        ),
        SemTerm::Lambda(params, body) => {
            if params.iter().any(|p| p == var) {
                // Shadowed by an inner binder.
                term.clone()
            } else {
                SemTerm::Lambda(params.clone(), Box::new(substitute(body, var, value)))
            }
        }
    }
}

struct TermParser<'t> {
    rest: &'t str,
    full: &'t str,
    params: &'t [String],
}

impl<'t> TermParser<'t> {
    fn error(&self, message: &str) -> ResourceError {
        ResourceError::new(
            "SemTerm".to_string(),
            format!("{} in '{}'", message, self.full),
        )
    }

    fn term(&mut self) -> Result<SemTerm, ResourceError> {
        self.rest = self.rest.trim_start();
        let symbol = self.symbol()?;
        let head = if self.params.iter().any(|p| p == &symbol) {
            SemTerm::Var(symbol)
        } else {
            SemTerm::Const(symbol)
        };
        self.rest = self.rest.trim_start();
        if let Some(stripped) = self.rest.strip_prefix('(') {
            self.rest = stripped;
            let mut args = vec![self.term()?];
            loop {
                self.rest = self.rest.trim_start();
                if let Some(stripped) = self.rest.strip_prefix(',') {
                    self.rest = stripped;
                    args.push(self.term()?);
                } else if let Some(stripped) = self.rest.strip_prefix(')') {
                    self.rest = stripped;
                    break;
                } else {
                    return Err(self.error("expected ',' or ')'"));
                }
            }
            Ok(SemTerm::Apply(Box::new(head), args))
        } else {
            Ok(head)
        }
    }

    fn symbol(&mut self) -> Result<String, ResourceError> {
        let end = self
            .rest
            .find(|c: char| matches!(c, '(' | ')' | ',' | '.' | '\\' | '{' | '}') || c.is_whitespace())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return Err(self.error("expected symbol"));
        }
        let symbol = self.rest[..end].to_string();
        self.rest = &self.rest[end..];
        Ok(symbol)
    }
}
