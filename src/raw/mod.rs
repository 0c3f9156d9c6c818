mod arena;
mod handle;
mod node;
mod raw_order_tree;

pub(crate) use raw_order_tree::RawOrderTree;
