use alloc::sync::Arc;

use config::inode::InodeMode;
use systype::SyscallResult;
use vfs::Vnode;

/// `/dev/null`: reads hit end of file at once and writes vanish.
pub struct NullDev;

impl NullDev {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl Vnode for NullDev {
    fn mode(&self) -> InodeMode {
        InodeMode::CHAR | InodeMode::from_bits_truncate(0o666)
    }

    fn size(&self) -> usize {
        0
    }

    fn read_at(&self, _offset: usize, _buf: &mut [u8]) -> SyscallResult {
        Ok(0)
    }

    fn write_at(&self, _offset: usize, buf: &[u8]) -> SyscallResult {
        Ok(buf.len())
    }
}
