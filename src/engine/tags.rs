//! @acp:module "Tag Matching"
//! @acp:summary "Normalized token membership for beater lists and protection tags"
//! @acp:domain engine
//! @acp:layer utility
//!
//! Beater lists arrive as comma-joined strings from the play pool. Matching
//! is exact on normalized tokens, so "3-4" never matches "3-4 Over".

use serde::{Deserialize, Deserializer};

/// Lower-case and trim a label for comparison
pub fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Split a comma-joined list into trimmed, non-empty entries
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `tags` contains `name` after normalization
pub fn contains_tag(tags: &[String], name: &str) -> bool {
    let wanted = normalize(name);
    !wanted.is_empty() && tags.iter().any(|t| normalize(t) == wanted)
}

/// Words of a free-form tag such as a pass-protection call ("Half Boot Rt")
pub fn words(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

/// Accept either `["Bear", "Over"]` or `"Bear, Over"`
pub fn deserialize_tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagField {
        List(Vec<String>),
        Joined(String),
        Missing,
    }

    Ok(match TagField::deserialize(deserializer)? {
        TagField::List(list) => list
            .iter()
            .flat_map(|entry| parse_tag_list(entry))
            .collect(),
        TagField::Joined(joined) => parse_tag_list(&joined),
        TagField::Missing => Vec::new(),
    })
}
