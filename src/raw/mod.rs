mod arena;
mod handle;
mod node;
mod raw_dos_tree;
mod size;

pub(crate) use handle::Handle;
pub(crate) use raw_dos_tree::RawDosTree;
