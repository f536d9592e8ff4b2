use crate::Log;
use std::fmt::{Display, Formatter};

impl<T> Log<T> {
    /// The label carried by an enabled level.
    pub fn label(&self) -> Option<&T> {
        match self {
            Log::None => None,
            Log::Default(label) | Log::Result(label) | Log::Verbose(label) => Some(label),
        }
    }

    /// Whether diagnostics requested at `level` should be printed under this setting.
    /// `Default` enables step summaries only, `Result` adds per-segment parse counts,
    /// `Verbose` also traces individual chart edges.
    pub fn covers<U>(&self, level: &Log<U>) -> bool {
        fn chattiness<T>(log: &Log<T>) -> u8 {
            match log {
                Log::None => 0,
                Log::Default(_) => 1,
                Log::Result(_) => 2,
                Log::Verbose(_) => 3,
            }
        }
        chattiness(self) >= chattiness(level)
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.label() {
            Some(label) => label.fmt(f),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_nest() {
        let verbose = Log::Verbose("chart");
        assert!(verbose.covers(&Log::Default(())));
        assert!(verbose.covers(&Log::Result(())));
        assert!(!Log::Default("chart").covers(&Log::Result(())));
        assert!(!Log::<&str>::None.covers(&Log::Default(())));
        assert_eq!(format!("{}", verbose), "chart");
    }
}
