//! Error cases for palette generation

use thiserror::Error;

/// Precondition failures reported by the library.
///
/// Every check happens before any clustering state is created or mutated,
/// so an error never leaves a partially computed palette behind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
	/// No samples were provided to cluster
	#[error("cannot generate a palette from zero samples")]
	NoSamples,
	/// The requested number of clusters was zero
	#[error("the number of clusters must be at least 1")]
	ZeroClusters,
	/// The iteration cap was zero, so not even the first assignment could run
	#[error("the maximum number of iterations must be at least 1")]
	ZeroIterations,
	/// A mean or medoid was requested for an empty set of members
	#[error("cannot compute the center of an empty set of colors")]
	EmptyMembers,
	/// The channel data does not match the buffer dimensions and layout
	#[error("expected {expected} bytes of channel data but got {actual}")]
	BufferSize {
		/// Number of bytes implied by width, height, and channel layout
		expected: usize,
		/// Number of bytes actually provided
		actual: usize,
	},
}
