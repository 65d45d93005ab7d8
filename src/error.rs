//! Errors surfaced by the graph session to the UI.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Why a graph session operation failed.
#[derive(Error, Debug)]
pub enum GraphError {
	/// A catalog or identity request failed. The triggering node stays
	/// unexpanded so the user can retry.
	#[error("could not reach the catalog: {0}")]
	Fetch(#[from] CatalogError),

	/// Mutations need a signed-in user.
	#[error("sign in required")]
	Unauthenticated,

	/// The request would break a graph invariant.
	#[error("{0}")]
	Invariant(&'static str),
}

/// Result of a graph session operation.
pub type GraphResult<T> = Result<T, GraphError>;
