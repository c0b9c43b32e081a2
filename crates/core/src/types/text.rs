//! Bounded, non-blank text fields.
//!
//! List names and task titles share the same rules: surrounding whitespace is
//! stripped, the result must not be empty, and its length (in characters, not
//! bytes) is capped. Each field gets its own type so a title can never be
//! stored as a list name.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a bounded text field.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    /// The input is empty or whitespace only.
    #[error("This field is required.")]
    Blank,
    /// The input contains a NUL character, which PostgreSQL text cannot hold.
    #[error("Null characters are not allowed.")]
    NullCharacter,
    /// The input exceeds the field's maximum length.
    #[error("Ensure this value has at most {max} characters (it has {actual}).")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Length of the rejected input.
        actual: usize,
    },
}

macro_rules! bounded_text {
    ($(#[$meta:meta])* $name:ident, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length, in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Parse and normalize the field.
            ///
            /// # Errors
            ///
            /// Returns [`TextError::Blank`] if the trimmed input is empty,
            /// [`TextError::NullCharacter`] if it contains `\0` and
            /// [`TextError::TooLong`] if it exceeds [`Self::MAX_LENGTH`].
            pub fn parse(s: &str) -> Result<Self, TextError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(TextError::Blank);
                }
                if trimmed.contains('\0') {
                    return Err(TextError::NullCharacter);
                }

                let actual = trimmed.chars().count();
                if actual > Self::MAX_LENGTH {
                    return Err(TextError::TooLong {
                        max: Self::MAX_LENGTH,
                        actual,
                    });
                }

                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the value and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TextError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

bounded_text!(
    /// The name of a to-do list (1-100 characters).
    ///
    /// ```
    /// use tasklists_core::{ListName, TextError};
    ///
    /// assert_eq!(ListName::parse("  Groceries ").unwrap().as_str(), "Groceries");
    /// assert_eq!(ListName::parse(""), Err(TextError::Blank));
    /// ```
    ListName,
    100
);

bounded_text!(
    /// The title of a task (1-200 characters).
    TaskTitle,
    200
);
