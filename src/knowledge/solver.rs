use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    algebra::{InheritanceAlgebra, KnowledgeAlgebra},
    index::{KnowledgeIndex, PropertySet},
};
use crate::{
    errors::{Error, Result},
    ontology::{Iri, OntologyContext, OntologyGraph, PropertyRef, Range},
};

/// How references to undeclared nodes are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityPolicy {
    /// Log a warning and carry on; dangling ranges become [`Range::Unknown`].
    #[default]
    Degrade,
    /// Fail with [`Error::DanglingReference`].
    Strict,
}

/// Anything able to turn an ontology into a [`KnowledgeIndex`].
pub trait IndexSolver: Send + Sync {
    /// # Errors
    ///
    /// Implementations fail when the ontology cannot be indexed, e.g. when the
    /// hierarchy contains a cycle.
    fn solve(&self, graph: &OntologyGraph, context: &OntologyContext) -> Result<KnowledgeIndex>;
}

/// Solver walking the hierarchy in topological order.
#[derive(Clone, Debug, Default)]
pub struct TopologicalSolver<A = InheritanceAlgebra> {
    algebra: A,
    policy: IntegrityPolicy,
}

impl TopologicalSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: KnowledgeAlgebra> TopologicalSolver<A> {
    /// Uses a custom merge rule.
    pub fn with_algebra(algebra: A) -> Self {
        Self {
            algebra,
            policy: IntegrityPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: IntegrityPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> IntegrityPolicy {
        self.policy
    }
}

impl<A: KnowledgeAlgebra> IndexSolver for TopologicalSolver<A> {
    fn solve(&self, graph: &OntologyGraph, context: &OntologyContext) -> Result<KnowledgeIndex> {
        solve_with_policy(graph, context, &self.algebra, self.policy)
    }
}

/// Builds the knowledge index of one ontology, degrading dangling references.
///
/// # Errors
///
/// Returns [`Error::Cycle`] when the hierarchy is not acyclic.
pub fn solve<A: KnowledgeAlgebra + ?Sized>(
    graph: &OntologyGraph,
    context: &OntologyContext,
    algebra: &A,
) -> Result<KnowledgeIndex> {
    solve_with_policy(graph, context, algebra, IntegrityPolicy::default())
}

/// Builds the knowledge index of one ontology.
///
/// Classes are visited ancestors first. Each class receives the universal
/// properties, the effective sets of its direct class ancestors in ascending
/// IRI order, and its own declarations, merged by `algebra`. Classes that do
/// not appear in the graph are treated as roots. Nothing is returned on
/// failure, so a partially built index never escapes.
///
/// # Errors
///
/// Returns [`Error::Cycle`] when the hierarchy is not acyclic and, under
/// [`IntegrityPolicy::Strict`], [`Error::DanglingReference`] for references
/// to undeclared nodes.
pub fn solve_with_policy<A: KnowledgeAlgebra + ?Sized>(
    graph: &OntologyGraph,
    context: &OntologyContext,
    algebra: &A,
    policy: IntegrityPolicy,
) -> Result<KnowledgeIndex> {
    check_integrity(graph, context, policy)?;
    let order = graph.topological_order()?;

    let resolver = PropertyResolver { context, policy };
    let universal = resolver.resolve_all(context.universal_properties())?;

    let ordered = order.iter().filter_map(|id| context.class(id));
    let detached = context.classes().filter(|class| !graph.contains(class.id()));

    let mut index = KnowledgeIndex::default();
    for class in ordered.chain(detached) {
        let own = resolver.resolve_all(class.properties())?;
        let ancestors: Vec<&PropertySet> = graph
            .parents(class.id())
            .filter_map(|parent| index.get(parent))
            .collect();
        let effective = algebra.combine(&own, &ancestors, &universal);
        index.insert(class.id().clone(), effective);
    }

    debug!(
        classes = index.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "knowledge_index_solved"
    );
    Ok(index)
}

fn check_integrity(
    graph: &OntologyGraph,
    context: &OntologyContext,
    policy: IntegrityPolicy,
) -> Result<()> {
    for (from, to) in graph.edges() {
        if !context.contains(from) {
            dangling(policy, to, from)?;
        }
        if !context.contains(to) {
            dangling(policy, from, to)?;
        }
    }
    for property in context.properties() {
        if let Some(domain) = property.domain() {
            if context.class(domain).is_none() {
                dangling(policy, property.id(), domain)?;
            }
        }
    }
    Ok(())
}

fn dangling(policy: IntegrityPolicy, node: &Iri, target: &Iri) -> Result<()> {
    match policy {
        IntegrityPolicy::Strict => Err(Error::DanglingReference {
            node: node.clone(),
            target: target.clone(),
        }),
        IntegrityPolicy::Degrade => {
            warn!(node = %node, target = %target, "ontology_dangling_reference");
            Ok(())
        }
    }
}

/// Completes property references against the property nodes of the context.
struct PropertyResolver<'a> {
    context: &'a OntologyContext,
    policy: IntegrityPolicy,
}

impl PropertyResolver<'_> {
    fn resolve_all(&self, properties: &[PropertyRef]) -> Result<Vec<PropertyRef>> {
        properties.iter().map(|property| self.resolve(property)).collect()
    }

    fn resolve(&self, property: &PropertyRef) -> Result<PropertyRef> {
        let mut resolved = property.clone();
        if let Some(node) = self.context.property(property.iri()) {
            resolved.set_functional(property.is_functional() || node.is_functional());
            if resolved.range().is_unknown() {
                resolved.set_range(node.range().clone());
            }
        }

        let dangling_range = resolved
            .range()
            .iri()
            .filter(|range| !range.is_builtin_datatype() && !self.context.contains(range))
            .cloned();
        if let Some(range) = dangling_range {
            dangling(self.policy, property.iri(), &range)?;
            resolved.set_range(Range::Unknown);
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::{solve, solve_with_policy, IndexSolver, IntegrityPolicy, TopologicalSolver};
    use crate::{
        errors::Error,
        knowledge::{InheritanceAlgebra, KnowledgeAlgebra, PropertySet},
        ontology::{
            ClassNode, Iri, OntologyContext, OntologyGraph, PropertyNode, PropertyRef, Range,
        },
    };

    fn iri(text: &str) -> Iri {
        Iri::new(format!("http://example.org/{text}")).expect("valid iri")
    }

    fn text_property(name: &str) -> PropertyRef {
        PropertyRef::new(iri(name), name, Iri::new("xsd:string").unwrap())
    }

    fn labels(index: &crate::knowledge::KnowledgeIndex, class: &str) -> Vec<String> {
        index
            .properties_of(&iri(class))
            .map(|property| property.label().to_owned())
            .collect()
    }

    #[test]
    fn diamond_inherits_from_both_parents() {
        let context = OntologyContext::new()
            .with_node(ClassNode::new(iri("Thing"), "Thing").with_property(text_property("name")))
            .and_then(|c| {
                c.with_node(
                    ClassNode::new(iri("Left"), "Left").with_property(text_property("left")),
                )
            })
            .and_then(|c| {
                c.with_node(
                    ClassNode::new(iri("Right"), "Right").with_property(text_property("right")),
                )
            })
            .and_then(|c| c.with_node(ClassNode::new(iri("Bottom"), "Bottom")))
            .expect("context");
        let graph = OntologyGraph::new()
            .with_edge(iri("Left"), iri("Thing"))
            .with_edge(iri("Right"), iri("Thing"))
            .with_edge(iri("Bottom"), iri("Left"))
            .with_edge(iri("Bottom"), iri("Right"));

        let index = solve(&graph, &context, &InheritanceAlgebra).expect("solved");
        assert_eq!(index.len(), 4);
        assert_eq!(labels(&index, "Bottom"), ["name", "left", "right"]);
    }

    #[test]
    fn lexically_later_parent_wins_collisions() {
        let context = OntologyContext::new()
            .with_node(
                ClassNode::new(iri("Alpha"), "Alpha")
                    .with_property(PropertyRef::new(iri("size"), "size", iri("Small"))),
            )
            .and_then(|c| {
                c.with_node(
                    ClassNode::new(iri("Beta"), "Beta")
                        .with_property(PropertyRef::new(iri("size"), "size", iri("Large"))),
                )
            })
            .and_then(|c| c.with_node(ClassNode::new(iri("Small"), "Small")))
            .and_then(|c| c.with_node(ClassNode::new(iri("Large"), "Large")))
            .and_then(|c| c.with_node(ClassNode::new(iri("Child"), "Child")))
            .expect("context");
        let graph = OntologyGraph::new()
            .with_edge(iri("Child"), iri("Beta"))
            .with_edge(iri("Child"), iri("Alpha"));

        let index = solve(&graph, &context, &InheritanceAlgebra).expect("solved");
        let size = index
            .get(&iri("Child"))
            .and_then(|set| set.get(&iri("size")))
            .expect("inherited size");
        assert_eq!(size.range(), &Range::Declared(iri("Large")));
    }

    #[test]
    fn classes_outside_the_graph_are_roots() {
        let context = OntologyContext::new()
            .with_node(ClassNode::new(iri("Solo"), "Solo").with_property(text_property("name")))
            .expect("context")
            .with_universal_property(text_property("id"));

        let index = solve(&OntologyGraph::new(), &context, &InheritanceAlgebra).expect("solved");
        assert_eq!(labels(&index, "Solo"), ["id", "name"]);
    }

    #[test]
    fn property_nodes_are_not_indexed() {
        let context = OntologyContext::new()
            .with_node(ClassNode::new(iri("Person"), "Person"))
            .and_then(|c| {
                c.with_node(
                    PropertyNode::new(iri("email"), "email", Iri::new("xsd:string").unwrap())
                        .with_domain(iri("Person")),
                )
            })
            .expect("context");
        let graph = OntologyGraph::new().with_edge(iri("email"), iri("Person"));

        let index = solve(&graph, &context, &InheritanceAlgebra).expect("solved");
        assert_eq!(index.len(), 1);
        assert!(index.contains_class(&iri("Person")));
        assert!(!index.contains_class(&iri("email")));
    }

    #[test]
    fn property_nodes_complete_references() {
        let context = OntologyContext::new()
            .with_node(
                ClassNode::new(iri("Person"), "Person").with_property(PropertyRef::new(
                    iri("birthDate"),
                    "birth date",
                    Range::Unknown,
                )),
            )
            .and_then(|c| {
                c.with_node(
                    PropertyNode::new(iri("birthDate"), "birth date", Iri::new("xsd:date").unwrap())
                        .with_domain(iri("Person"))
                        .functional(),
                )
            })
            .expect("context");

        let index = solve(&OntologyGraph::new(), &context, &InheritanceAlgebra).expect("solved");
        let birth = index
            .get(&iri("Person"))
            .and_then(|set| set.get(&iri("birthDate")))
            .expect("resolved");
        assert!(birth.is_functional());
        assert_eq!(birth.range().to_string(), "xsd:date");
    }

    #[test]
    fn dangling_range_degrades_to_unknown() {
        let context = OntologyContext::new()
            .with_node(
                ClassNode::new(iri("Dog"), "Dog")
                    .with_property(PropertyRef::new(iri("owner"), "owner", iri("Person"))),
            )
            .expect("context");

        let index = solve(&OntologyGraph::new(), &context, &InheritanceAlgebra).expect("solved");
        let owner = index
            .get(&iri("Dog"))
            .and_then(|set| set.get(&iri("owner")))
            .expect("resolved");
        assert_eq!(owner.range(), &Range::Unknown);
        assert_eq!(owner.range().to_string(), "unknown");
    }

    #[test]
    fn strict_policy_rejects_dangling_references() {
        let context = OntologyContext::new()
            .with_node(ClassNode::new(iri("Dog"), "Dog"))
            .expect("context");
        let graph = OntologyGraph::new().with_edge(iri("Dog"), iri("Animal"));

        let err = solve_with_policy(&graph, &context, &InheritanceAlgebra, IntegrityPolicy::Strict)
            .expect_err("dangling edge");
        assert!(matches!(
            err,
            Error::DanglingReference { node, target }
                if node == iri("Dog") && target == iri("Animal")
        ));

        let index = solve(&graph, &context, &InheritanceAlgebra).expect("degraded");
        assert!(index.contains_class(&iri("Dog")));
    }

    #[test]
    fn strict_policy_rejects_unknown_domains() {
        let context = OntologyContext::new()
            .with_node(
                PropertyNode::new(iri("name"), "name", Iri::new("xsd:string").unwrap())
                    .with_domain(iri("Missing")),
            )
            .expect("context");
        let solver = TopologicalSolver::new().with_policy(IntegrityPolicy::Strict);

        let err = solver
            .solve(&OntologyGraph::new(), &context)
            .expect_err("dangling domain");
        assert!(matches!(err, Error::DanglingReference { .. }));
    }

    #[test]
    fn strict_policy_rejects_undeclared_ranges() {
        let context = OntologyContext::new()
            .with_node(
                ClassNode::new(iri("Dog"), "Dog")
                    .with_property(PropertyRef::new(iri("owner"), "owner", iri("Person"))),
            )
            .expect("context");
        let graph = OntologyGraph::new();

        let err = solve_with_policy(&graph, &context, &InheritanceAlgebra, IntegrityPolicy::Strict)
            .expect_err("dangling range");
        assert!(matches!(
            err,
            Error::DanglingReference { node, target }
                if node == iri("owner") && target == iri("Person")
        ));

        let index = solve(&graph, &context, &InheritanceAlgebra).expect("degraded");
        let owner = index
            .get(&iri("Dog"))
            .and_then(|set| set.get(&iri("owner")))
            .expect("owner kept");
        assert!(owner.range().is_unknown());
    }

    #[test]
    fn cycle_fails_without_an_index() {
        let context = OntologyContext::new()
            .with_node(ClassNode::new(iri("A"), "A"))
            .and_then(|c| c.with_node(ClassNode::new(iri("B"), "B")))
            .expect("context");
        let graph = OntologyGraph::new()
            .with_edge(iri("A"), iri("B"))
            .with_edge(iri("B"), iri("A"));

        let err = solve(&graph, &context, &InheritanceAlgebra).expect_err("cycle");
        assert!(matches!(err, Error::Cycle { .. }));
    }

    struct OwnOnly;

    impl KnowledgeAlgebra for OwnOnly {
        fn combine(
            &self,
            own: &[PropertyRef],
            _ancestors: &[&PropertySet],
            _universal: &[PropertyRef],
        ) -> PropertySet {
            own.iter().cloned().collect()
        }
    }

    #[test]
    fn custom_algebra_is_honoured() {
        let context = OntologyContext::new()
            .with_node(ClassNode::new(iri("Animal"), "Animal").with_property(text_property("name")))
            .and_then(|c| {
                c.with_node(ClassNode::new(iri("Dog"), "Dog").with_property(text_property("breed")))
            })
            .expect("context")
            .with_universal_property(text_property("id"));
        let graph = OntologyGraph::new().with_edge(iri("Dog"), iri("Animal"));

        let index = TopologicalSolver::with_algebra(OwnOnly)
            .solve(&graph, &context)
            .expect("solved");
        assert_eq!(labels(&index, "Dog"), ["breed"]);
    }
}
