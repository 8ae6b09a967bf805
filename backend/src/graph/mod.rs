//! Transaction graph: storage, construction and the SIMILAR index
//!
//! - **store**: node table and typed adjacency
//! - **builder**: node creation, `NEXT` chain, `SIMILAR` edges
//! - **similarity**: bucketed time-window index for `SIMILAR`

pub mod builder;
pub mod similarity;
pub mod store;

pub use builder::{build_graph, chronological_order, link_similar, link_temporal};
pub use similarity::{is_similar, SimilarityIndex};
pub use store::{Edge, EdgeKind, GraphError, TransactionGraph};
