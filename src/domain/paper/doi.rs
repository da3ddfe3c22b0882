//! DOI value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::EmptyDoiError;

/// Digital Object Identifier.
///
/// Opaque: only surrounding whitespace is removed, the rest is passed to
/// the metadata provider as typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Doi(String);

impl Doi {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Doi {
    type Err = EmptyDoiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyDoiError);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
