use alloc::sync::Arc;

use config::{inode::InodeMode, vfs::OpenFlags};
use systype::SysResult;

use crate::vnode::Vnode;

/// A filesystem as the descriptor layer uses it: something that turns a
/// path into a vnode reference.
pub trait FileSystem: Send + Sync {
    fn name(&self) -> &str;

    /// Resolves `path` and returns a new reference to its vnode.
    ///
    /// Creation flags (`O_CREAT`, `O_EXCL`, `O_TRUNC`) and `mode` are
    /// interpreted here; access-mode checks happen here as well, so a
    /// returned vnode always permits the requested access. Errors such as
    /// `ENOENT`, `EACCES` and `EISDIR` reach the caller unchanged.
    fn open(&self, path: &str, flags: OpenFlags, mode: InodeMode) -> SysResult<Arc<dyn Vnode>>;
}
