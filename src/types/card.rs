//! Card types as returned by the catalog API.
//!
//! Only the fields the selector, the cache and presentation collaborators
//! need are modelled; everything else in the upstream payload is ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// A single card. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<CardSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: CardImages,
    #[serde(default, deserialize_with = "null_as_default")]
    pub abilities: Vec<Ability>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attacks: Vec<Attack>,
}

impl Card {
    /// Create a card with just a name and number.
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            number: number.into(),
            set: None,
            rarity: None,
            types: Vec::new(),
            images: CardImages::default(),
            abilities: Vec::new(),
            attacks: Vec::new(),
        }
    }

    /// Attach a set.
    #[must_use]
    pub fn with_set(mut self, set: CardSet) -> Self {
        self.set = Some(set);
        self
    }

    /// Set identifier, if the card carries a non-empty one.
    pub fn set_id(&self) -> Option<&str> {
        self.set
            .as_ref()
            .map(|s| s.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Printed total of the card's set, if it is a known integer.
    pub fn printed_total(&self) -> Option<i64> {
        self.set.as_ref().and_then(|s| s.printed_total)
    }

    /// Preferred image URL: large, falling back to small.
    pub fn best_image(&self) -> Option<&str> {
        self.images
            .large
            .as_deref()
            .or(self.images.small.as_deref())
    }
}

/// The set (expansion) a card was printed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Non-integer values in the payload are treated as unknown.
    #[serde(
        default,
        deserialize_with = "integer_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub printed_total: Option<i64>,
}

impl CardSet {
    pub fn new(id: impl Into<String>, name: impl Into<String>, printed_total: Option<i64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            printed_total,
        }
    }

    /// Printed total for display, `"?"` when unknown.
    pub fn printed_total_label(&self) -> String {
        self.printed_total
            .map_or_else(|| "?".to_string(), |t| t.to_string())
    }
}

fn integer_or_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cost: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub damage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// Body of a successful search: `{ "data": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Card>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
