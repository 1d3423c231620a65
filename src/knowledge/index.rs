use std::collections::BTreeMap;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::ontology::{Iri, PropertyRef};

/// Effective properties of one class, keyed by property IRI.
///
/// Keeps the position at which each IRI first appeared; replacing a property
/// with the same IRI swaps its value in place. Equality is order sensitive.
#[derive(Clone, Debug, Default)]
pub struct PropertySet {
    properties: IndexMap<Iri, PropertyRef>,
}

impl PropertySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` properties.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            properties: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts or overrides a property, returning the value it replaced.
    pub fn insert(&mut self, property: PropertyRef) -> Option<PropertyRef> {
        self.properties.insert(property.iri().clone(), property)
    }

    /// Returns the property registered under `iri`.
    #[must_use]
    pub fn get(&self, iri: &Iri) -> Option<&PropertyRef> {
        self.properties.get(iri)
    }

    /// Whether a property with this IRI is present.
    #[must_use]
    pub fn contains(&self, iri: &Iri) -> bool {
        self.properties.contains_key(iri)
    }

    /// Returns the number of distinct properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates properties in the order their IRIs first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyRef> {
        self.properties.values()
    }
}

impl PartialEq for PropertySet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for PropertySet {}

impl FromIterator<PropertyRef> for PropertySet {
    fn from_iter<I: IntoIterator<Item = PropertyRef>>(iter: I) -> Self {
        let mut set = Self::new();
        for property in iter {
            set.insert(property);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a PropertyRef;
    type IntoIter = indexmap::map::Values<'a, Iri, PropertyRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.values()
    }
}

impl Serialize for PropertySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Fully resolved property sets for every class of one ontology.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KnowledgeIndex {
    entries: BTreeMap<Iri, PropertySet>,
}

impl KnowledgeIndex {
    pub(crate) fn insert(&mut self, class: Iri, properties: PropertySet) {
        self.entries.insert(class, properties);
    }

    /// Returns the effective property set of `class`.
    #[must_use]
    pub fn get(&self, class: &Iri) -> Option<&PropertySet> {
        self.entries.get(class)
    }

    /// Effective properties of `class`; empty when the class is not indexed.
    pub fn properties_of<'a>(&'a self, class: &Iri) -> impl Iterator<Item = &'a PropertyRef> + 'a {
        self.entries.get(class).into_iter().flat_map(PropertySet::iter)
    }

    /// Whether `class` has an entry in the index.
    #[must_use]
    pub fn contains_class(&self, class: &Iri) -> bool {
        self.entries.contains_key(class)
    }

    /// Indexed classes in ascending identifier order.
    pub fn classes(&self) -> impl Iterator<Item = &Iri> {
        self.entries.keys()
    }

    /// Returns the number of indexed classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the effective properties of `class` as plain text for prompts.
    #[must_use]
    pub fn describe(&self, class: &Iri) -> String {
        let properties: Vec<&PropertyRef> = self.properties_of(class).collect();
        if properties.is_empty() {
            return format!("Class `{class}` has no known properties.");
        }

        let mut text = format!("Class `{class}` ({} properties):", properties.len());
        for property in properties {
            let _ = write!(
                text,
                "\n  - {} ({}): {}",
                property.label(),
                property.iri(),
                property.range()
            );
            if property.is_functional() {
                text.push_str(" [functional]");
            }
        }
        text
    }
}
