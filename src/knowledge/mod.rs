//! Knowledge index construction and caching.
//!
//! [`solver`] walks an ontology's class hierarchy ancestors first and applies
//! an [`algebra::KnowledgeAlgebra`] to every class, producing a
//! [`KnowledgeIndex`]. [`cache::KnowledgeCache`] memoizes those indexes by
//! ontology content hash so repeated extraction requests against the same
//! ontology do not pay for the traversal again.

pub mod algebra;
pub mod cache;
pub mod clock;
pub mod index;
pub mod solver;

pub use algebra::{InheritanceAlgebra, KnowledgeAlgebra};
pub use cache::{CacheStats, KnowledgeCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use index::{KnowledgeIndex, PropertySet};
pub use solver::{solve, solve_with_policy, IndexSolver, IntegrityPolicy, TopologicalSolver};
