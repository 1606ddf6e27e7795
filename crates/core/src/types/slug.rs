//! URL-safe category slugs.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A URL-safe identifier derived from a display name.
///
/// ## Constraints
///
/// - Non-empty
/// - Only lowercase ASCII letters, digits and `-`
///
/// ## Examples
///
/// ```
/// use hearth_core::Slug;
///
/// assert_eq!(Slug::from_name("Living Room").as_str(), "living-room");
/// assert!(Slug::parse("living-room").is_ok());
/// assert!(Slug::parse("Living Room").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct Slug(String);

impl Slug {
    /// Parse an already-formed slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters other
    /// than lowercase ASCII letters, digits, or `-`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name.
    ///
    /// Lowercases the name and joins whitespace-separated words with `-`.
    /// Anything else that is not URL-safe is dropped, so the result always
    /// passes [`Slug::parse`] unless the name had no usable characters, in
    /// which case the slug is `"category"`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .split_whitespace()
            .map(|word| {
                word.to_lowercase()
                    .chars()
                    .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        if slug.is_empty() {
            Self("category".to_owned())
        } else {
            Self(slug)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}
