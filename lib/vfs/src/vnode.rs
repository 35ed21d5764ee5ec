use config::{
    inode::{InodeMode, InodeType},
    vfs::OpenFlags,
};
use downcast_rs::{DowncastSync, impl_downcast};
use systype::{SysError, SysResult, SyscallResult};

/// An open file's identity as the filesystem sees it.
///
/// A vnode is handed out as `Arc<dyn Vnode>`: cloning the `Arc` takes a
/// reference, dropping it gives the reference back, and the filesystem
/// frees the vnode once no reference is left.
pub trait Vnode: Send + Sync + DowncastSync {
    /// File type and permission bits.
    fn mode(&self) -> InodeMode;

    /// Current length in bytes. Devices without a length report 0.
    fn size(&self) -> usize;

    /// Reads at `offset`, filling `buf` until it is full or the end of the
    /// data is reached. Returns the number of bytes read; 0 means end of
    /// file.
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> SyscallResult;

    /// Writes `buf` at `offset` and returns the number of bytes written,
    /// which may be fewer than `buf.len()`.
    fn write_at(&self, offset: usize, buf: &[u8]) -> SyscallResult;

    /// Whether a position within this vnode means anything. Streams such as
    /// consoles and pipes return `false`.
    fn is_seekable(&self) -> bool {
        true
    }
}

impl dyn Vnode {
    pub fn vtype(&self) -> InodeType {
        self.mode().to_type()
    }

    /// Checks an `open` request against what this vnode allows: directories
    /// refuse write access, `O_DIRECTORY` demands a directory, and the owner
    /// permission bits gate read and write access.
    pub fn check_access(&self, flags: OpenFlags) -> SysResult<()> {
        let mode = self.mode();
        let is_dir = self.vtype().is_dir();
        if flags.contains(OpenFlags::O_DIRECTORY) && !is_dir {
            return Err(SysError::ENOTDIR);
        }
        if is_dir && flags.writable() {
            return Err(SysError::EISDIR);
        }
        if flags.readable() && !mode.contains(InodeMode::OWNER_READ) {
            log::warn!("[Vnode::check_access] read denied, mode {:o}", mode.bits());
            return Err(SysError::EACCES);
        }
        if flags.writable() && !mode.contains(InodeMode::OWNER_WRITE) {
            log::warn!("[Vnode::check_access] write denied, mode {:o}", mode.bits());
            return Err(SysError::EACCES);
        }
        Ok(())
    }
}

impl_downcast!(sync Vnode);
