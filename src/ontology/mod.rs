//! Ontology input model.
//!
//! The types here describe an ontology after it has been parsed: validated
//! identifiers, class and property nodes, the context holding them and the
//! hierarchy graph linking them. Nothing in this module performs inheritance;
//! see [`crate::knowledge`] for that.

pub mod entities;
pub mod fingerprint;
pub mod graph;
pub mod value_objects;

pub use entities::{
    ClassNode, OntologyContext, OntologyError, OntologyNode, PropertyNode, PropertyRef, Range,
    UNKNOWN_RANGE,
};
pub use fingerprint::fingerprint;
pub use graph::OntologyGraph;
pub use value_objects::{Iri, IriError};
