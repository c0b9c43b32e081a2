//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("username may only contain letters, digits and @/./+/-/_ (found {0:?})")]
    InvalidCharacter(char),
}

/// A login name.
///
/// Usernames are the identity the rest of the system hangs off: every list
/// is owned by exactly one user, and ownership is checked by user ID.
///
/// ## Constraints
///
/// - Length: 1-150 characters
/// - Characters: alphanumerics plus `@`, `.`, `+`, `-`, `_`
///
/// ## Examples
///
/// ```
/// use tasklists_core::Username;
///
/// assert!(Username::parse("alice").is_ok());
/// assert!(Username::parse("bob.smith+lists@home").is_ok());
///
/// assert!(Username::parse("").is_err());
/// assert!(Username::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username, in characters.
    pub const MAX_LENGTH: usize = 150;

    /// Parse a `Username` from a string.
    ///
    /// Surrounding whitespace is removed before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Is longer than 150 characters
    /// - Contains a character other than an alphanumeric or `@.+-_`
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
        {
            return Err(UsernameError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_usernames() {
        assert!(Username::parse("alice").is_ok());
        assert!(Username::parse("alice_2").is_ok());
        assert!(Username::parse("a.b-c+d@e").is_ok());
        assert!(Username::parse("élodie").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let name = Username::parse("  alice \n").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(151);
        assert!(matches!(
            Username::parse(&long),
            Err(UsernameError::TooLong { max: 150 })
        ));
        assert!(Username::parse(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Username::parse("bob smith"),
            Err(UsernameError::InvalidCharacter(' '))
        );
        assert_eq!(
            Username::parse("bob/smith"),
            Err(UsernameError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_from_str() {
        let name: Username = "carol".parse().unwrap();
        assert_eq!(name.to_string(), "carol");
    }
}
