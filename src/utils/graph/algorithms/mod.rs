//! Graph algorithms generic over the adjacency traits.

mod traversal;

pub use traversal::{postorder, reachable, reverse_postorder};
