//! Wire property codec
//!
//! Personalizations are persisted as a flat bag of strings:
//!
//! ```text
//! {"Delivery Date":"Tue Feb 20 2024",
//!  "Including":"Carrots 1kg (2),Curly Kale (2),Daikon Radish ea",
//!  "Add on Items":"Bellbird Ciabatta,Cabbage Green (2)",
//!  "Swapped Items":"Silverbeet (2)",
//!  "Removed Items":"Beetroot 1kg"}
//! ```
//!
//! Each list is comma separated; a trailing `(N)` is the quantity (default 1).
//! Decoding never fails on list content: malformed entries are repaired and
//! reported as [`DecodeError`]s next to the decoded value.

use crate::entry::{Entry, EntryKind, ListItem, ListKind};
use crate::error::{DecodeError, WireError};
use crate::personalization::Personalization;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Legacy stand-in for an absent list
pub const NONE_SENTINEL: &str = "None";

/// Trailing `(N)` on a wire token
///
/// The legacy format has no escaping, so a title that itself ends in `(N)`,
/// such as `Eggs (6)`, is indistinguishable from a quantity. Such titles are
/// always written with an explicit suffix, `Eggs (6) (1)`, which decodes back
/// to the full title.
static QUANTITY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<title>.*?)\s*\(\s*(?P<qty>[+-]?\d+)\s*\)$")
        .expect("quantity suffix pattern compiles")
});

/// Persisted personalization property bag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireProperties {
    /// Delivery date, `Tue Feb 20 2024` form
    #[serde(rename = "Delivery Date")]
    pub delivery_date: String,
    /// Standard items
    #[serde(rename = "Including", default, deserialize_with = "nullable_list")]
    pub including: String,
    /// Add-ons
    #[serde(rename = "Add on Items", default, deserialize_with = "nullable_list")]
    pub add_on_items: String,
    /// Swapped-in add-ons
    #[serde(rename = "Swapped Items", default, deserialize_with = "nullable_list")]
    pub swapped_items: String,
    /// Removed standard items
    #[serde(rename = "Removed Items", default, deserialize_with = "nullable_list")]
    pub removed_items: String,
}

fn nullable_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl WireProperties {
    /// Parse from JSON
    ///
    /// # Errors
    /// Returns [`WireError::Malformed`] if the JSON does not match the bag shape
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as JSON
    ///
    /// # Errors
    /// Returns [`WireError::Malformed`] if serialization fails
    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Raw string of one list
    #[inline]
    #[must_use]
    pub fn list(&self, list: ListKind) -> &str {
        match list {
            ListKind::Including => &self.including,
            ListKind::AddOnItems => &self.add_on_items,
            ListKind::SwappedItems => &self.swapped_items,
            ListKind::RemovedItems => &self.removed_items,
        }
    }

    fn list_mut(&mut self, list: ListKind) -> &mut String {
        match list {
            ListKind::Including => &mut self.including,
            ListKind::AddOnItems => &mut self.add_on_items,
            ListKind::SwappedItems => &mut self.swapped_items,
            ListKind::RemovedItems => &mut self.removed_items,
        }
    }
}

/// A decoded value with the recoverable problems found on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// Decoded value
    pub value: T,
    /// Repaired or skipped entries
    pub errors: Vec<DecodeError>,
}

impl<T> Decoded<T> {
    /// Value with no decode errors
    #[inline]
    #[must_use]
    pub fn clean(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    /// Whether decoding needed no repairs
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Codec between [`WireProperties`] and [`Personalization`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyCodec;

impl PropertyCodec {
    /// Decode one wire list
    #[must_use]
    pub fn decode_list(list: ListKind, raw: &str) -> Decoded<Vec<ListItem>> {
        let raw = raw.trim();
        if raw.is_empty() || raw == NONE_SENTINEL {
            return Decoded::clean(Vec::new());
        }

        let mut errors = Vec::new();
        let items = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| parse_item(list, token, &mut errors))
            .collect();

        for error in &errors {
            tracing::warn!(list = %list, error = %error, "repaired personalization entry");
        }

        Decoded {
            value: items,
            errors,
        }
    }

    /// Encode one wire list
    ///
    /// Zero-quantity items are dropped. Single units are written bare unless
    /// the title would read as a quantity.
    #[must_use]
    pub fn encode_list(items: &[ListItem]) -> String {
        items
            .iter()
            .filter(|item| item.quantity > 0)
            .map(|item| {
                if item.quantity > 1 || QUANTITY_SUFFIX.is_match(&item.title) {
                    format!("{} ({})", item.title, item.quantity)
                } else {
                    item.title.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decode a property bag
    ///
    /// Decoded entries carry no product ids; those are resolved against a box
    /// during reconciliation.
    ///
    /// # Errors
    /// Returns [`WireError::InvalidDeliveryDate`] if the date does not parse
    pub fn decode(props: &WireProperties) -> Result<Decoded<Personalization>, WireError> {
        let delivery_date = props.delivery_date.parse()?;
        let mut state = Personalization::new(delivery_date);
        let mut errors = Vec::new();

        for list in ListKind::ALL {
            let decoded = Self::decode_list(list, props.list(list));
            errors.extend(decoded.errors);
            let kind = list.entry_kind();
            for item in decoded.value {
                state.push(Entry::new(kind, item.title, item.quantity));
            }
        }

        Ok(Decoded {
            value: state,
            errors,
        })
    }

    /// Encode a personalization into a property bag
    ///
    /// Carried `ExtraIncluded` units are folded into the matching standard item.
    #[must_use]
    pub fn encode(state: &Personalization) -> WireProperties {
        let mut props = WireProperties {
            delivery_date: state.delivery_date.to_string(),
            ..WireProperties::default()
        };

        for list in ListKind::ALL {
            let items = match list {
                ListKind::Including => including_items(state),
                other => state.list_items(other),
            };
            *props.list_mut(list) = Self::encode_list(&items);
        }

        props
    }
}

fn parse_item(list: ListKind, token: &str, errors: &mut Vec<DecodeError>) -> Option<ListItem> {
    let Some(caps) = QUANTITY_SUFFIX.captures(token) else {
        return Some(ListItem::single(token));
    };

    let title = caps["title"].trim();
    if title.is_empty() {
        errors.push(DecodeError::MissingTitle {
            list,
            raw: token.to_string(),
        });
        return None;
    }

    let raw_quantity = &caps["qty"];
    let mut quantity = match raw_quantity.parse::<u32>() {
        Ok(q) if q > 0 => q,
        _ => {
            errors.push(DecodeError::MalformedQuantity {
                list,
                title: title.to_string(),
                raw: raw_quantity.to_string(),
            });
            1
        }
    };

    if list == ListKind::RemovedItems && quantity != 1 {
        errors.push(DecodeError::RemovedQuantityIgnored {
            title: title.to_string(),
        });
        quantity = 1;
    }

    Some(ListItem::new(title, quantity))
}

fn including_items(state: &Personalization) -> Vec<ListItem> {
    let mut items = state.list_items(ListKind::Including);
    for extra in state.of_kind(EntryKind::ExtraIncluded) {
        match items.iter_mut().find(|item| item.title == extra.title) {
            Some(item) => item.quantity += extra.quantity,
            None => items.push(ListItem::new(extra.title.clone(), extra.quantity + 1)),
        }
    }
    items
}
