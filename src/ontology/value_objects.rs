use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespaces whose members are datatypes rather than ontology nodes.
const DATATYPE_NAMESPACES: [&str; 6] = [
    "http://www.w3.org/2001/XMLSchema#",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.w3.org/2000/01/rdf-schema#",
    "xsd:",
    "rdf:",
    "rdfs:",
];

/// Validated identifier for ontology nodes and properties.
///
/// Ordering is lexical on the textual form, which is what makes traversal and
/// inheritance order reproducible across runs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`].
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the segment after the last `#`, `/` or `:`.
    ///
    /// Falls back to the full identifier when that segment would be empty.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.value
            .rsplit(|c: char| matches!(c, '#' | '/' | ':'))
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&self.value)
    }

    /// Whether the identifier names an XSD, RDF or RDFS term.
    #[must_use]
    pub fn is_builtin_datatype(&self) -> bool {
        DATATYPE_NAMESPACES
            .iter()
            .any(|namespace| self.value.starts_with(namespace))
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.value
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
}
