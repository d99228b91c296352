use core::fmt;
use core::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Identifier of a per-plot form field.
///
/// The wire format is `<prefix><index><suffix>`:
/// - `prefix` is the semantic group (`x`, `tw`, `rw`, `o`, ...)
/// - `index` is the 0-based position of the owning plot
/// - `suffix` distinguishes fields within a group (`b` in `x0b`, `color` in `o1color`)
///
/// Identifiers double as the flat key namespace of the plot request, so two
/// plots must never hold the same key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    prefix: String,
    index: usize,
    suffix: String,
}

impl FieldKey {
    pub fn new(prefix: impl Into<String>, index: usize, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            index,
            suffix: suffix.into(),
        }
    }

    /// Parse `x0b`, `tw1`, `o2color`.
    ///
    /// Identifiers without a digit run after the prefix (global fields such
    /// as `xr` or `t`) are rejected with [`CoreError::MissingIndex`].
    pub fn parse(ident: &str) -> CoreResult<Self> {
        if ident.is_empty() {
            return Err(CoreError::EmptyIdentifier);
        }
        if let Some(ch) = ident
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(CoreError::InvalidChar {
                ident: ident.to_string(),
                ch,
            });
        }

        let prefix_len = ident
            .find(|c: char| !c.is_ascii_lowercase())
            .unwrap_or(ident.len());
        if prefix_len == 0 {
            return Err(CoreError::MissingPrefix {
                ident: ident.to_string(),
            });
        }

        let rest = &ident[prefix_len..];
        let digits_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits_len == 0 {
            return Err(CoreError::MissingIndex {
                ident: ident.to_string(),
            });
        }

        let index = rest[..digits_len]
            .parse::<usize>()
            .map_err(|_| CoreError::MissingIndex {
                ident: ident.to_string(),
            })?;

        Ok(Self {
            prefix: ident[..prefix_len].to_string(),
            index,
            suffix: rest[digits_len..].to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Same field, moved to another plot position.
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            prefix: self.prefix.clone(),
            index,
            suffix: self.suffix.clone(),
        }
    }

    /// Index-free form, e.g. `x*b`.
    pub fn stem(&self) -> String {
        format!("{}*{}", self.prefix, self.suffix)
    }
}

impl FromStr for FieldKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldKey({})", self)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.index, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_suffixed_keys() {
        let k = FieldKey::parse("x0").unwrap();
        assert_eq!((k.prefix(), k.index(), k.suffix()), ("x", 0, ""));

        let k = FieldKey::parse("x3b").unwrap();
        assert_eq!((k.prefix(), k.index(), k.suffix()), ("x", 3, "b"));

        let k = FieldKey::parse("o12color").unwrap();
        assert_eq!((k.prefix(), k.index(), k.suffix()), ("o", 12, "color"));

        let k = FieldKey::parse("tw1").unwrap();
        assert_eq!((k.prefix(), k.index(), k.suffix()), ("tw", 1, ""));
    }

    #[test]
    fn global_names_have_no_index() {
        for ident in ["xr", "t", "expertmode", "yrtw"] {
            assert!(matches!(
                FieldKey::parse(ident),
                Err(CoreError::MissingIndex { .. })
            ));
        }
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(FieldKey::parse(""), Err(CoreError::EmptyIdentifier));
        assert!(matches!(
            FieldKey::parse("0x"),
            Err(CoreError::MissingPrefix { .. })
        ));
        assert!(matches!(
            FieldKey::parse("x 0"),
            Err(CoreError::InvalidChar { ch: ' ', .. })
        ));
    }

    #[test]
    fn with_index_rewrites_only_position() {
        let k = FieldKey::parse("o2color").unwrap();
        let moved = k.with_index(0);
        assert_eq!(moved.to_string(), "o0color");
        assert_eq!(moved.stem(), k.stem());
        assert_eq!(k.stem(), "o*color");
    }
}
