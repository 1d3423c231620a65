//! Crate-wide error type.

use std::path::PathBuf;

use crate::ontology::{Iri, IriError, OntologyError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The subclass relation is not acyclic.
    #[error("class hierarchy contains a cycle: {}", display_path(.path))]
    Cycle { path: Vec<Iri> },

    /// A node refers to an identifier the context does not declare.
    #[error("`{node}` references undeclared node `{target}`")]
    DanglingReference { node: Iri, target: Iri },

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    Iri(#[from] IriError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration `{path}`: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to initialize logger: {0}")]
    Logger(String),
}

impl Error {
    /// Whether the failure comes from the ontology content rather than the host.
    #[must_use]
    pub fn is_ontology_defect(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. } | Self::DanglingReference { .. } | Self::Ontology(_) | Self::Iri(_)
        )
    }
}

fn display_path(path: &[Iri]) -> String {
    path.iter()
        .map(Iri::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
