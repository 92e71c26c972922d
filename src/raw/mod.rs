mod arena;
mod handle;
mod iter;
mod node;
mod ordered;
mod rank_index;
mod size;
mod tree;

pub(crate) use iter::{RawCursor, RawIter};
pub(crate) use node::{Count, Side};
pub(crate) use tree::RawTree;
