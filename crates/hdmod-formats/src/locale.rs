//! Localization codes used by the `LOC` archive directories

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Locale of a localized asset set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Locale {
    /// `CH`
    Chinese,
    /// `CZ`
    Czech,
    /// `DE`
    German,
    /// `EN`
    English,
    /// `ES`
    Spanish,
    /// `FR`
    French,
    /// `IT`
    Italian,
    /// `PL`
    Polish,
    /// `RU`
    Russian,
}

/// Locale code with no known display language
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale code: {0}")]
pub struct UnknownLocale(pub String);

impl Locale {
    /// Resolve a directory code such as `DE` (case-insensitive)
    pub fn from_code(code: &str) -> Result<Self, UnknownLocale> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CH" => Ok(Self::Chinese),
            "CZ" => Ok(Self::Czech),
            "DE" => Ok(Self::German),
            "EN" => Ok(Self::English),
            "ES" => Ok(Self::Spanish),
            "FR" => Ok(Self::French),
            "IT" => Ok(Self::Italian),
            "PL" => Ok(Self::Polish),
            "RU" => Ok(Self::Russian),
            _ => Err(UnknownLocale(code.to_string())),
        }
    }

    /// Two-letter uppercase code
    pub const fn code(self) -> &'static str {
        match self {
            Self::Chinese => "CH",
            Self::Czech => "CZ",
            Self::German => "DE",
            Self::English => "EN",
            Self::Spanish => "ES",
            Self::French => "FR",
            Self::Italian => "IT",
            Self::Polish => "PL",
            Self::Russian => "RU",
        }
    }

    /// Lowercase language name as the target engine spells it
    pub const fn language(self) -> &'static str {
        match self {
            Self::Chinese => "chinese",
            Self::Czech => "czech",
            Self::German => "german",
            Self::English => "english",
            Self::Spanish => "spanish",
            Self::French => "french",
            Self::Italian => "italian",
            Self::Polish => "polish",
            Self::Russian => "russian",
        }
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(Locale::from_code("de"), Ok(Locale::German));
        assert_eq!(Locale::from_code("RU").map(Locale::language), Ok("russian"));
        assert_eq!(Locale::Polish.code(), "PL");
    }

    #[test]
    fn test_unknown_code() {
        let err = Locale::from_code("XX").unwrap_err();
        assert_eq!(err.to_string(), "unknown locale code: XX");
    }
}
