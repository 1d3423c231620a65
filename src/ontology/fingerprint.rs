use serde::Serialize;

use super::{entities::OntologyContext, graph::OntologyGraph};

#[derive(Serialize)]
struct Canonical<'a> {
    context: &'a OntologyContext,
    graph: &'a OntologyGraph,
}

/// Stable structural fingerprint of an ontology, usable as a cache key.
///
/// Both inputs keep their nodes and edges in ordered collections, so the JSON
/// encoding is canonical and equal ontologies hash equally regardless of the
/// order in which they were assembled.
#[must_use]
pub fn fingerprint(context: &OntologyContext, graph: &OntologyGraph) -> u64 {
    let canonical = Canonical { context, graph };
    let bytes = serde_json::to_vec(&canonical)
        .expect("ontology model serializes to JSON: string keys and plain data only");
    let digest = blake3::hash(&bytes);
    let mut head = [0_u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

#[cfg(test)]
mod tests {
    use super::fingerprint;
    use crate::ontology::{ClassNode, Iri, OntologyContext, OntologyGraph, PropertyRef};

    fn iri(text: &str) -> Iri {
        Iri::new(format!("http://example.org/{text}")).expect("valid iri")
    }

    fn context_with(order: &[&str]) -> OntologyContext {
        let mut context = OntologyContext::new();
        for name in order {
            context
                .add_node(ClassNode::new(iri(name), *name))
                .expect("class inserted");
        }
        context
    }

    #[test]
    fn insertion_order_does_not_change_the_fingerprint() {
        let graph = OntologyGraph::new().with_edge(iri("Dog"), iri("Animal"));
        let other_graph = OntologyGraph::new().with_edge(iri("Dog"), iri("Animal"));

        assert_eq!(
            fingerprint(&context_with(&["Animal", "Dog"]), &graph),
            fingerprint(&context_with(&["Dog", "Animal"]), &other_graph)
        );
    }

    #[test]
    fn content_changes_alter_the_fingerprint() {
        let graph = OntologyGraph::new().with_edge(iri("Dog"), iri("Animal"));
        let base = context_with(&["Animal", "Dog"]);
        let extended = base
            .clone()
            .with_universal_property(PropertyRef::new(iri("name"), "name", iri("name")));

        assert_ne!(fingerprint(&base, &graph), fingerprint(&extended, &graph));
        assert_ne!(
            fingerprint(&base, &graph),
            fingerprint(&base, &OntologyGraph::new())
        );
    }
}
