#![no_std]

pub mod fs;
pub mod inode;
pub mod process;
pub mod vfs;
