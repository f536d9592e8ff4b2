use crate::ResourceError;
use std::fmt::{Display, Formatter};

impl ResourceError {
    pub fn new(what: String, message: String) -> Self {
        Self { message, what }
    }

    pub fn what(&self) -> &str {
        &self.what
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ResourceError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for ResourceError {}
