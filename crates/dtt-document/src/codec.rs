//! Shared interface of the tree document codecs.

use dtt_model::Dataset;

use crate::error::Result;

/// Converts between datasets and an in-memory document tree.
pub trait TreeCodec {
    /// Document tree type.
    type Tree;

    /// Encode a dataset, skipping group-length attributes.
    fn encode(&self, dataset: &Dataset) -> Result<Self::Tree>;

    /// Decode a document tree, then link and check private creators.
    fn decode(&self, tree: &Self::Tree) -> Result<Dataset>;
}
