use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value_objects::Iri;

/// Label rendered for a range that could not be determined.
pub const UNKNOWN_RANGE: &str = "unknown";

/// Value type of a property.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Range {
    /// Range named by a class or datatype identifier.
    Declared(Iri),
    /// Range missing or pointing at an undeclared node.
    Unknown,
}

impl Range {
    /// Returns the declared identifier, if any.
    #[must_use]
    pub fn iri(&self) -> Option<&Iri> {
        match self {
            Self::Declared(iri) => Some(iri),
            Self::Unknown => None,
        }
    }

    /// Whether the range is the `unknown` placeholder.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared(iri) => f.write_str(iri.as_str()),
            Self::Unknown => f.write_str(UNKNOWN_RANGE),
        }
    }
}

impl From<Iri> for Range {
    fn from(iri: Iri) -> Self {
        Self::Declared(iri)
    }
}

/// Property attached to a class, as declared or as resolved into an index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    iri: Iri,
    label: String,
    range: Range,
    #[serde(default)]
    functional: bool,
}

impl PropertyRef {
    /// Creates a non-functional property reference.
    #[must_use]
    pub fn new(iri: Iri, label: impl Into<String>, range: impl Into<Range>) -> Self {
        Self {
            iri,
            label: label.into(),
            range: range.into(),
            functional: false,
        }
    }

    /// Marks the property as holding at most one value per subject.
    #[must_use]
    pub fn functional(mut self) -> Self {
        self.functional = true;
        self
    }

    /// Returns the property identifier.
    #[must_use]
    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    /// Returns the declared label, or the local name of the IRI when it is blank.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.label.trim().is_empty() {
            self.iri.local_name()
        } else {
            &self.label
        }
    }

    /// Returns the resolved or declared range.
    #[must_use]
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Whether the property holds at most one value per subject.
    #[must_use]
    pub fn is_functional(&self) -> bool {
        self.functional
    }

    pub(crate) fn set_range(&mut self, range: Range) {
        self.range = range;
    }

    pub(crate) fn set_functional(&mut self, functional: bool) {
        self.functional = functional;
    }
}

/// Class declaration owning an ordered list of properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNode {
    id: Iri,
    label: String,
    properties: Vec<PropertyRef>,
}

impl ClassNode {
    /// Creates a class with no owned properties.
    #[must_use]
    pub fn new(id: Iri, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            properties: Vec::new(),
        }
    }

    /// Appends an owned property declaration.
    #[must_use]
    pub fn with_property(mut self, property: PropertyRef) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns the unique identifier of the class.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the human readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns owned properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyRef] {
        &self.properties
    }
}

/// Property declaration with its domain and range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyNode {
    id: Iri,
    label: String,
    domain: Option<Iri>,
    range: Range,
    functional: bool,
}

impl PropertyNode {
    /// Creates a property with no domain, which makes it universal.
    #[must_use]
    pub fn new(id: Iri, label: impl Into<String>, range: impl Into<Range>) -> Self {
        Self {
            id,
            label: label.into(),
            domain: None,
            range: range.into(),
            functional: false,
        }
    }

    /// Restricts the property to the supplied owning class.
    #[must_use]
    pub fn with_domain(mut self, domain: Iri) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Marks the property as holding at most one value per subject.
    #[must_use]
    pub fn functional(mut self) -> Self {
        self.functional = true;
        self
    }

    /// Returns the unique identifier of the property.
    #[must_use]
    pub fn id(&self) -> &Iri {
        &self.id
    }

    /// Returns the human readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the owning class, if restricted to one.
    #[must_use]
    pub fn domain(&self) -> Option<&Iri> {
        self.domain.as_ref()
    }

    /// Returns the declared range.
    #[must_use]
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Whether the property holds at most one value per subject.
    #[must_use]
    pub fn is_functional(&self) -> bool {
        self.functional
    }

    /// Whether the property applies to every class.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.domain.is_none()
    }

    /// Builds the reference a class would carry for this property.
    #[must_use]
    pub fn to_ref(&self) -> PropertyRef {
        PropertyRef {
            iri: self.id.clone(),
            label: self.label.clone(),
            range: self.range.clone(),
            functional: self.functional,
        }
    }
}

/// Schema element stored in an [`OntologyContext`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OntologyNode {
    Class(ClassNode),
    Property(PropertyNode),
}

impl OntologyNode {
    /// Returns the identifier of the wrapped node.
    #[must_use]
    pub fn id(&self) -> &Iri {
        match self {
            Self::Class(class) => class.id(),
            Self::Property(property) => property.id(),
        }
    }

    /// Returns the label of the wrapped node.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Class(class) => class.label(),
            Self::Property(property) => property.label(),
        }
    }
}

impl From<ClassNode> for OntologyNode {
    fn from(class: ClassNode) -> Self {
        Self::Class(class)
    }
}

impl From<PropertyNode> for OntologyNode {
    fn from(property: PropertyNode) -> Self {
        Self::Property(property)
    }
}

/// Parsed ontology: every node by id plus the properties that apply everywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyContext {
    nodes: BTreeMap<Iri, OntologyNode>,
    universal_properties: Vec<PropertyRef>,
}

impl OntologyContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, enforcing unique identifiers.
    pub fn add_node(&mut self, node: impl Into<OntologyNode>) -> Result<(), OntologyError> {
        let node = node.into();
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(OntologyError::DuplicateNode(id));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Builder variant of [`Self::add_node`].
    pub fn with_node(mut self, node: impl Into<OntologyNode>) -> Result<Self, OntologyError> {
        self.add_node(node)?;
        Ok(self)
    }

    /// Appends a property that applies to every class.
    #[must_use]
    pub fn with_universal_property(mut self, property: PropertyRef) -> Self {
        self.universal_properties.push(property);
        self
    }

    /// Looks up any node by identifier.
    #[must_use]
    pub fn node(&self, id: &Iri) -> Option<&OntologyNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &Iri) -> bool {
        self.nodes.contains_key(id)
    }

    /// Looks up a class node; `None` for properties and unknown ids.
    #[must_use]
    pub fn class(&self, id: &Iri) -> Option<&ClassNode> {
        match self.nodes.get(id)? {
            OntologyNode::Class(class) => Some(class),
            OntologyNode::Property(_) => None,
        }
    }

    /// Looks up a property node; `None` for classes and unknown ids.
    #[must_use]
    pub fn property(&self, id: &Iri) -> Option<&PropertyNode> {
        match self.nodes.get(id)? {
            OntologyNode::Property(property) => Some(property),
            OntologyNode::Class(_) => None,
        }
    }

    /// Returns all nodes ordered by identifier.
    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<Iri, OntologyNode> {
        &self.nodes
    }

    /// Iterates class nodes ordered by identifier.
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.nodes.values().filter_map(|node| match node {
            OntologyNode::Class(class) => Some(class),
            OntologyNode::Property(_) => None,
        })
    }

    /// Iterates property nodes ordered by identifier.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyNode> {
        self.nodes.values().filter_map(|node| match node {
            OntologyNode::Property(property) => Some(property),
            OntologyNode::Class(_) => None,
        })
    }

    /// Returns the properties that apply to every class.
    #[must_use]
    pub fn universal_properties(&self) -> &[PropertyRef] {
        &self.universal_properties
    }
}

/// Errors raised when assembling an ontology context.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OntologyError {
    /// Attempted to add a node with an existing identifier.
    #[error("node `{0}` already exists")]
    DuplicateNode(Iri),
}
