//! Device vnodes and their registration under `/dev`.

pub mod null;
pub mod tty;

use config::inode::InodeMode;
use systype::SysResult;

use crate::simple::SimpleFs;

/// Creates `/dev` with the console and the null device.
pub fn register(fs: &SimpleFs) -> SysResult<()> {
    fs.mkdir("/dev", InodeMode::from_bits_truncate(0o755))?;
    fs.insert("/dev/tty", tty::init())?;
    fs.insert("/dev/null", null::NullDev::new())?;
    Ok(())
}
