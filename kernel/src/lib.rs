#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub mod console;
pub mod logging;
pub mod syscall;
pub mod task;

use alloc::sync::Arc;

use osfs::SimpleFs;
use systype::SysResult;
use vfs::FileSystem;

/// Brings up the root filesystem with its devices, then the logger, whose
/// output goes to the console device registered there.
pub fn init() -> SysResult<Arc<SimpleFs>> {
    let fs = osfs::init()?;
    logging::init();
    log::info!("[kernel] root filesystem `{}` ready", fs.name());
    Ok(fs)
}
