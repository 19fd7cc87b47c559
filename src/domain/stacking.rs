//! Display stacking for inventories.
//!
//! The resolver returns raw, uncombined grant entries. Consumers that
//! want `"3 Potions of Healing"` instead of three separate rows apply
//! this module as a post-processing step: entries are grouped by
//! normalized name and description, quantity prefixes are summed, and a
//! display name is re-rendered. Normalized names are sort/group keys
//! only, never identity.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Possession;
use super::id::ItemId;
use serde::Serialize;
use utoipa::ToSchema;

static QTY_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\d+)x? ").ok());
static LEADING_PLURAL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\w+)s\b").ok());
static LEADING_ARTICLE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(A|An|The) ").ok());
static CONSUMABLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+x? )?((Potion|Scroll|Spell Scroll|Charm|Elixir)s? of)").ok());
static FIRST_WORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\w+)( .+)$").ok());

/// A consolidated inventory row for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StackedItem {
    /// Grant identifier of the first entry in the stack.
    pub id: ItemId,
    /// Re-rendered display name, quantity included when above one.
    pub name: String,
    /// Shared description of the stacked entries.
    pub description: String,
    /// Number of entries consolidated into this row.
    pub quantity: u32,
}

/// Parses the leading quantity of an item name (`"3x Potion…"` → 3).
///
/// Names without a prefix count as quantity 1.
#[must_use]
pub fn quantity(name: &str) -> u32 {
    QTY_PREFIX
        .as_ref()
        .and_then(|re| re.captures(name))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Strips the leading quantity prefix from an item name.
#[must_use]
pub fn strip_quantity(name: &str) -> String {
    QTY_PREFIX
        .as_ref()
        .map_or_else(|| name.to_string(), |re| re.replace(name, "").into_owned())
}

/// Whether the name denotes a stackable consumable
/// (potions, scrolls, charms, elixirs).
#[must_use]
pub fn is_consumable(name: &str) -> bool {
    CONSUMABLE
        .as_ref()
        .is_some_and(|re| re.is_match(name.trim()))
}

/// Normalizes an item name into a sort/group key.
///
/// Strips the quantity prefix, folds `"Spell Scroll"` to `"Scroll"`,
/// collapses the plural on the leading word, and strips leading
/// articles. `"3x Potions of Healing"` and `"A Potion of Healing"`
/// normalize to the same key.
#[must_use]
pub fn sort_key(name: &str) -> String {
    let mut key = strip_quantity(name).replace("Spell Scroll", "Scroll");
    if let Some(re) = LEADING_PLURAL.as_ref() {
        key = re.replace(&key, "$1").into_owned();
    }
    if let Some(re) = LEADING_ARTICLE.as_ref() {
        key = re.replace(&key, "").into_owned();
    }
    key
}

/// Inserts a plural `s` after the leading word (`"Potion of Healing"` →
/// `"Potions of Healing"`). Single-word names are left alone.
fn pluralize_leading(name: &str) -> String {
    FIRST_WORD
        .as_ref()
        .map_or_else(|| name.to_string(), |re| re.replace(name, "${1}s${2}").into_owned())
}

/// Collapses the plural on the leading word.
fn singularize_leading(name: &str) -> String {
    LEADING_PLURAL
        .as_ref()
        .map_or_else(|| name.to_string(), |re| re.replace(name, "$1").into_owned())
}

/// Consolidates raw resolver output into display rows.
///
/// Entries are grouped by normalized name plus trimmed description;
/// quantity prefixes are parsed and summed. Consumable names are
/// re-pluralized when the stack grows past one. Input order is kept:
/// a stack sits where its first entry was granted.
#[must_use]
pub fn consolidate(possessions: &[Possession]) -> Vec<StackedItem> {
    let mut stacks: Vec<StackedItem> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for possession in possessions {
        let bare = strip_quantity(&possession.name);
        let description = possession.description.trim().to_string();
        let key = format!("{}_{}", sort_key(&possession.name), description);
        let qty = quantity(&possession.name);

        if let Some(&at) = index.get(&key) {
            if let Some(stack) = stacks.get_mut(at) {
                stack.quantity += qty;
                let mut name = singularize_leading(&bare);
                if stack.quantity > 1 {
                    if is_consumable(&name) {
                        name = pluralize_leading(&name);
                    }
                    stack.name = format!("{} {name}", stack.quantity);
                } else {
                    stack.name = name;
                }
            }
        } else {
            index.insert(key, stacks.len());
            stacks.push(StackedItem {
                id: possession.id,
                name: if qty > 1 {
                    format!("{qty} {bare}")
                } else {
                    bare
                },
                description,
                quantity: qty,
            });
        }
    }

    stacks
}

/// Consolidates and sorts rows by normalized name for display.
#[must_use]
pub fn stacked_sorted(possessions: &[Possession]) -> Vec<StackedItem> {
    let mut stacks = consolidate(possessions);
    stacks.sort_by_key(|s| sort_key(&s.name));
    stacks
}
