use std::{any::type_name, fmt, str::FromStr};

use convert_case::{Case, Casing};

use crate::error::{Error, Result};

/// A diagnostic name for a node: lowercase ASCII letters, digits and underscores.
///
/// Names are not unique and carry no semantics. They label nodes in tree dumps, layout
/// tables and log output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeName(String);

impl NodeName {
    /// Is this character allowed in a node name?
    pub fn valid_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }

    /// Munge an arbitrary string into a node name: snake-case it, then drop anything that is
    /// not a valid name character. An empty result becomes `node`.
    pub fn convert(raw: &str) -> Self {
        let snake = raw.to_case(Case::Snake);
        let name: String = snake.chars().filter(|c| Self::valid_char(*c)).collect();
        if name.is_empty() {
            Self("node".into())
        } else {
            Self(name)
        }
    }

    /// Name derived from the last path segment of a Rust type, e.g. `DatePicker` becomes
    /// `date_picker`.
    pub fn of<T: ?Sized>() -> Self {
        let full = type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        let short = base.rsplit("::").next().unwrap_or(base);
        Self::convert(short)
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NodeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for NodeName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        if s.is_empty() || !s.chars().all(Self::valid_char) {
            return Err(Error::Invalid(format!("node name {s:?}")));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DatePicker;

    #[test]
    fn convert() {
        assert_eq!(NodeName::convert("ScrollView"), "scroll_view");
        assert_eq!(NodeName::convert("Items View"), "items_view");
        assert_eq!(NodeName::convert("--"), "node");
        assert_eq!(NodeName::of::<DatePicker>(), "date_picker");
    }

    #[test]
    fn validate() {
        assert!(NodeName::try_from("stack_2").is_ok());
        assert!(NodeName::try_from("Stack").is_err());
        assert!("".parse::<NodeName>().is_err());
    }
}
