//! Ontology-driven knowledge index.
//!
//! Turns a parsed ontology (an [`ontology::OntologyContext`] plus its
//! [`ontology::OntologyGraph`]) into a [`knowledge::KnowledgeIndex`]: for each
//! class, the full set of properties it declares or inherits. Extraction
//! pipelines use that index to steer prompts, and share one
//! [`knowledge::KnowledgeCache`] so that each distinct ontology is solved once
//! per time-to-live window.
//!
//! ```
//! use std::sync::Arc;
//!
//! use ontology_index::{
//!     knowledge::{KnowledgeCache, TopologicalSolver},
//!     ontology::{fingerprint, ClassNode, Iri, OntologyContext, OntologyGraph, PropertyRef},
//! };
//!
//! let animal = Iri::new("http://example.org/Animal")?;
//! let dog = Iri::new("http://example.org/Dog")?;
//! let name = Iri::new("http://example.org/name")?;
//! let string = Iri::new("http://www.w3.org/2001/XMLSchema#string")?;
//!
//! let context = OntologyContext::new()
//!     .with_node(
//!         ClassNode::new(animal.clone(), "Animal")
//!             .with_property(PropertyRef::new(name, "name", string)),
//!     )?
//!     .with_node(ClassNode::new(dog.clone(), "Dog"))?;
//! let graph = OntologyGraph::new().with_edge(dog.clone(), animal);
//!
//! let cache = KnowledgeCache::new(Arc::new(TopologicalSolver::new()));
//! let index = cache.get_knowledge_index(fingerprint(&context, &graph), &context, &graph)?;
//! assert_eq!(index.properties_of(&dog).count(), 1);
//! # Ok::<(), ontology_index::Error>(())
//! ```

pub mod config;
pub mod errors;
pub mod knowledge;
pub mod logger;
pub mod ontology;

pub use errors::{Error, Result};
