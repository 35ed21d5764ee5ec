//! The contract between the descriptor layer and whatever filesystem sits
//! below it. Nothing in here knows about descriptors or offsets.

#![no_std]

extern crate alloc;

pub mod fs;
pub mod vnode;

pub use fs::FileSystem;
pub use vnode::Vnode;
