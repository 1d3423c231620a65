use super::index::PropertySet;
use crate::ontology::PropertyRef;

/// Merge rule deriving a class's effective properties.
pub trait KnowledgeAlgebra: Send + Sync {
    /// Combines a class's own declarations with the effective sets of its
    /// direct ancestors (already in their fixed order) and the universal
    /// properties of the ontology.
    fn combine(
        &self,
        own: &[PropertyRef],
        ancestors: &[&PropertySet],
        universal: &[PropertyRef],
    ) -> PropertySet;
}

/// Default inheritance rule.
///
/// Universal properties come first, then each ancestor set is folded in
/// order, then the class's own declarations. On an IRI collision the later
/// source wins, so an own declaration overrides anything inherited and a later
/// ancestor overrides an earlier one. Overridden properties keep the position
/// where their IRI first appeared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InheritanceAlgebra;

impl KnowledgeAlgebra for InheritanceAlgebra {
    fn combine(
        &self,
        own: &[PropertyRef],
        ancestors: &[&PropertySet],
        universal: &[PropertyRef],
    ) -> PropertySet {
        let inherited: usize = ancestors.iter().map(|set| set.len()).sum();
        let mut effective = PropertySet::with_capacity(universal.len() + inherited + own.len());

        for property in universal {
            effective.insert(property.clone());
        }
        for ancestor in ancestors {
            for property in ancestor.iter() {
                effective.insert(property.clone());
            }
        }
        for property in own {
            effective.insert(property.clone());
        }

        effective
    }
}
