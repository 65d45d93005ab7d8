//! Incrementally grown competence graph: roles → grades → positions/skills.
//!
//! The [`GraphStore`] owns the nodes, [`GraphSession`] wires it to the
//! catalog and identity collaborators, and [`project`] turns it into what the
//! canvas draws.

mod edit;
mod expand;
mod node;
mod ownership;
mod project;
mod session;
mod store;
mod style;

pub use expand::{Activation, DetailEntry, DetailPanel};
pub use node::{Node, NodeId, NodeKind, ROOT_ID};
pub use ownership::{MarkOutcome, is_fully_owned};
pub use project::{FilterSet, ProjectedNode, Projection, project};
pub use session::GraphSession;
pub use store::{Edge, GraphStore};
pub use style::{COVERED, NodeStyle, OWNED, OwnershipView, kind_style, style};
