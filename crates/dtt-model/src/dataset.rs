//! Ordered attribute collections.

use std::collections::BTreeMap;

use crate::{Item, Tag, Value};

/// Ordered, tag-unique collection of items.
///
/// Items are ordered and keyed by their numeric `(group, element)` pair, so a
/// dataset can never hold two private attributes that share numbers but
/// differ in creator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    items: BTreeMap<u32, Item>,
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, returning the item previously stored under its numbers.
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.tag().key(), item)
    }

    /// Look up an item by tag numbers.
    #[must_use]
    pub fn get(&self, tag: &Tag) -> Option<&Item> {
        self.items.get(&tag.key())
    }

    /// Mutable lookup by tag numbers.
    pub fn get_mut(&mut self, tag: &Tag) -> Option<&mut Item> {
        self.items.get_mut(&tag.key())
    }

    /// Remove an item by tag numbers.
    pub fn remove(&mut self, tag: &Tag) -> Option<Item> {
        self.items.remove(&tag.key())
    }

    /// Whether an item with these tag numbers is present.
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.items.contains_key(&tag.key())
    }

    /// Items in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Tags in order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.items.values().map(Item::tag)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the dataset has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Private creator governing `tag`.
    ///
    /// Uses the creator bound to the tag when present, otherwise the string
    /// stored in the sibling creator slot `(gggg,00xx)`.
    #[must_use]
    pub fn creator_for<'a>(&'a self, tag: &'a Tag) -> Option<&'a str> {
        if let Some(creator) = tag.creator.as_deref() {
            return Some(creator);
        }
        let slot = tag.creator_slot()?;
        match self.get(&slot)?.value() {
            Value::Text(text) => {
                let creator = text.trim_end_matches([' ', '\0']).trim_start();
                (!creator.is_empty()).then_some(creator)
            }
            _ => None,
        }
    }

    /// Bind every private data element to the creator stored in its sibling
    /// creator slot, recursing into sequences.
    ///
    /// Returns the number of items that were bound.
    pub fn link_private_creators(&mut self) -> usize {
        let mut bindings = Vec::new();
        for item in self.items.values() {
            let tag = item.tag();
            if tag.creator_slot().is_none() {
                continue;
            }
            let slot_creator = tag
                .creator_slot()
                .and_then(|slot| self.get(&slot))
                .and_then(|slot| match slot.value() {
                    Value::Text(text) => Some(text.trim_end_matches([' ', '\0']).trim_start()),
                    _ => None,
                })
                .filter(|creator| !creator.is_empty());
            if let Some(creator) = slot_creator
                && tag.creator.as_deref() != Some(creator)
            {
                bindings.push((tag.key(), creator.to_string()));
            }
        }

        let mut linked = bindings.len();
        for (key, creator) in bindings {
            if let Some(item) = self.items.get_mut(&key) {
                tracing::trace!(tag = %item.tag(), creator = %creator, "Linked private creator");
                item.set_creator(creator);
            }
        }

        for item in self.items.values_mut() {
            if let Some(nested) = item.sequence_mut() {
                linked += nested
                    .iter_mut()
                    .map(Dataset::link_private_creators)
                    .sum::<usize>();
            }
        }
        linked
    }
}

impl FromIterator<Item> for Dataset {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for item in iter {
            dataset.insert(item);
        }
        dataset
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Item;
    type IntoIter = std::collections::btree_map::Values<'a, u32, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
