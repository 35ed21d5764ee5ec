use alloc::{sync::Arc, vec::Vec};

use config::{fs::MAX_FILE_SIZE, inode::InodeMode};
use mutex::SpinNoIrqLock;
use systype::{SysError, SysResult, SyscallResult};
use vfs::Vnode;

/// A regular file or directory kept entirely in memory.
pub struct SimpleVnode {
    mode: InodeMode,
    data: SpinNoIrqLock<Vec<u8>>,
}

impl SimpleVnode {
    pub fn new_file(perm: InodeMode) -> Arc<Self> {
        Arc::new(Self {
            mode: perm.permissions() | InodeMode::REG,
            data: SpinNoIrqLock::new(Vec::new()),
        })
    }

    pub fn new_dir(perm: InodeMode) -> Arc<Self> {
        Arc::new(Self {
            mode: perm.permissions() | InodeMode::DIR,
            data: SpinNoIrqLock::new(Vec::new()),
        })
    }

    pub fn truncate(&self, len: usize) -> SysResult<()> {
        if self.mode.to_type().is_dir() {
            return Err(SysError::EISDIR);
        }
        let mut data = self.data.lock();
        grow(&mut data, len)?;
        data.truncate(len);
        Ok(())
    }
}

/// Zero-fills `data` up to `len` bytes. Growing past [`MAX_FILE_SIZE`] is
/// `EFBIG`, and running out of memory is `ENOSPC`.
fn grow(data: &mut Vec<u8>, len: usize) -> SysResult<()> {
    if len > MAX_FILE_SIZE {
        return Err(SysError::EFBIG);
    }
    if data.len() < len {
        data.try_reserve(len - data.len()).map_err(|_| SysError::ENOSPC)?;
        data.resize(len, 0);
    }
    Ok(())
}

impl Vnode for SimpleVnode {
    fn mode(&self) -> InodeMode {
        self.mode
    }

    fn size(&self) -> usize {
        self.data.lock().len()
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> SyscallResult {
        if self.mode.to_type().is_dir() {
            return Err(SysError::EISDIR);
        }
        let data = self.data.lock();
        if offset >= data.len() {
            return Ok(0);
        }
        let len = buf.len().min(data.len() - offset);
        buf[..len].copy_from_slice(&data[offset..offset + len]);
        Ok(len)
    }

    /// Writing past the end fills the gap with zeroes. Nothing is written
    /// if the file would grow past [`MAX_FILE_SIZE`].
    fn write_at(&self, offset: usize, buf: &[u8]) -> SyscallResult {
        if self.mode.to_type().is_dir() {
            return Err(SysError::EISDIR);
        }
        let end = offset.checked_add(buf.len()).ok_or(SysError::EFBIG)?;
        let mut data = self.data.lock();
        grow(&mut data, end)?;
        data[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }
}
