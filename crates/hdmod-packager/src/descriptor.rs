//! `mod.json` descriptors

use hdmod_formats::{Locale, Scale};
use serde::{Deserialize, Serialize};

const AUTHOR: &str = "Ubisoft";
const CONTACT: &str = "vcmi.eu";
const VERSION: &str = "1.0";

/// Top-level metadata of one mod unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModDescriptor {
    /// Author
    pub author: String,
    /// Contact address
    pub contact: String,
    /// Human readable description
    pub description: String,
    /// `Graphical` or `Translation`
    pub mod_type: String,
    /// Display name
    pub name: String,
    /// Mod version
    pub version: String,
    /// Display language, translation mods only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ModDescriptor {
    fn new(description: String, mod_type: &str, name: String) -> Self {
        Self {
            author: AUTHOR.to_string(),
            contact: CONTACT.to_string(),
            description,
            mod_type: mod_type.to_string(),
            name,
            version: VERSION.to_string(),
            language: None,
        }
    }

    /// Aggregate mod containing every scale and translation
    pub fn aggregate() -> Self {
        Self::new(
            "Extracted resources from official Heroes HD to make it usable on VCMI".to_string(),
            "Graphical",
            "Heroes HD (official)".to_string(),
        )
    }

    /// Language-independent resources of one scale
    pub fn for_scale(scale: Scale) -> Self {
        Self::new(
            format!("Resources (x{scale})"),
            "Graphical",
            format!("HD (x{scale})"),
        )
    }

    /// Localized resources of one scale
    pub fn for_translation(scale: Scale, locale: Locale) -> Self {
        let language = locale.language();
        Self {
            language: Some(language.to_string()),
            ..Self::new(
                format!("Translated resources (x{scale})"),
                "Translation",
                format!("HD Localisation ({language}) (x{scale})"),
            )
        }
    }
}
