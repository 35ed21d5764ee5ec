//! Open files, descriptor tables, and the in-memory filesystem and devices
//! the kernel boots with.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::sync::Arc;

use systype::SysResult;

pub mod dev;
pub mod fd_table;
pub mod file;
pub mod simple;

pub use fd_table::{Fd, FdFlags, FdInfo, FdTable};
pub use file::{FilePointer, OpenFile};
pub use simple::{SimpleFs, SimpleVnode};

pub const ROOT_FS_NAME: &str = "simple";

/// Builds the root filesystem with `/dev` populated.
pub fn init() -> SysResult<Arc<SimpleFs>> {
    let root = SimpleFs::new(ROOT_FS_NAME);
    dev::register(&root)?;
    log::info!("[osfs::init] root filesystem `{ROOT_FS_NAME}` ready");
    Ok(root)
}
