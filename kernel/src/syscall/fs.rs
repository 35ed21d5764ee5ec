use config::{
    fs::PATH_MAX,
    inode::InodeMode,
    vfs::{OpenFlags, Whence},
};
use osfs::{Fd, FdFlags, OpenFile};
use systype::{SysError, SyscallResult};
use vfs::FileSystem;

use crate::task::Task;

/// `open()` opens the file named by `path` and returns the lowest-numbered
/// descriptor not currently open in `task`.
///
/// # Flags
/// `flags` must carry exactly one access mode: `O_RDONLY`, `O_WRONLY` or
/// `O_RDWR`. `O_CREAT`, `O_EXCL`, `O_TRUNC` and `O_DIRECTORY` are handled by
/// the filesystem; `mode` gives the permission bits of a created file.
/// `O_APPEND` makes every write land at the end of the file, and
/// `O_CLOEXEC` marks the new descriptor close-on-exec.
///
/// # Tips
/// - Every call creates a new open file starting at offset 0, even for a
///   path that is already open. Offsets are only shared through `dup`.
/// - Errors from the filesystem come back unchanged.
/// - When the table is full the call fails with `EMFILE` and the open file
///   it built is released again, together with its vnode reference.
pub fn sys_open(task: &Task, path: &str, flags: i32, mode: u32) -> SyscallResult {
    let flags = OpenFlags::from_bits(flags).ok_or(SysError::EINVAL)?;
    let mode = InodeMode::from_bits_truncate(mode);
    log::info!("[sys_open] task {}, path: {path}, flags: {flags:?}, mode: {mode:?}", task.tid());

    if !flags.has_valid_access_mode() {
        return Err(SysError::EINVAL);
    }
    if path.is_empty() {
        return Err(SysError::ENOENT);
    }
    if path.len() > PATH_MAX {
        return Err(SysError::ENAMETOOLONG);
    }

    let vnode = task.fs().open(path, flags, mode)?;
    let file = OpenFile::new(vnode, flags);
    task.with_mut_fd_table(|table| table.alloc(file, FdFlags::from(flags)))
}

/// `close()` releases descriptor `fd`. The open file behind it is destroyed
/// once no descriptor in any task names it.
pub fn sys_close(task: &Task, fd: Fd) -> SyscallResult {
    log::info!("[sys_close] task {}, fd: {fd}", task.tid());
    let fd_info = task.with_mut_fd_table(|table| table.remove(fd))?;
    drop(fd_info);
    Ok(0)
}

/// `read()` attempts to read up to `len` bytes from `fd` into `buf`.
///
/// # Returns
/// The number of bytes read; zero means end of file. The file offset is
/// advanced by the same number.
///
/// # Tips
/// - `len` larger than `buf` fails with `EFAULT` and nothing is read.
/// - The table lock is not held while the vnode works: the open file is
///   resolved to its own reference first.
pub fn sys_read(task: &Task, fd: Fd, buf: &mut [u8], len: usize) -> SyscallResult {
    log::info!("[sys_read] task {}, fd: {fd}, len: {len:#x}", task.tid());
    let file = task.with_mut_fd_table(|table| table.get_file(fd))?;
    let buf = buf.get_mut(..len).ok_or(SysError::EFAULT)?;
    file.read(buf)
}

/// `write()` writes up to `len` bytes from `buf` to `fd`.
///
/// # Returns
/// The number of bytes written, which may be less than `len`. The file
/// offset is advanced by the same number.
pub fn sys_write(task: &Task, fd: Fd, buf: &[u8], len: usize) -> SyscallResult {
    log::info!("[sys_write] task {}, fd: {fd}, len: {len:#x}", task.tid());
    let file = task.with_mut_fd_table(|table| table.get_file(fd))?;
    let buf = buf.get(..len).ok_or(SysError::EFAULT)?;
    file.write(buf)
}

/// `lseek()` repositions the offset of the open file behind `fd`:
/// # Whence
/// - SEEK_SET: the offset is set to `offset` bytes.
/// - SEEK_CUR: the offset is set to its current location plus `offset`.
/// - SEEK_END: the offset is set to the size of the file plus `offset`.
/// # Tips
/// - The offset may be set beyond the end of the file; this does not change
///   the size, and a read there returns 0.
/// - A resulting offset below 0, or an unknown `whence`, fails with
///   `EINVAL`. Streams such as the console fail with `ESPIPE`.
pub fn sys_lseek(task: &Task, fd: Fd, offset: isize, whence: usize) -> SyscallResult {
    log::info!("[sys_lseek] task {}, fd: {fd}, offset: {offset}, whence: {whence}", task.tid());
    let file = task.with_mut_fd_table(|table| table.get_file(fd))?;
    let whence = Whence::from_repr(whence).ok_or(SysError::EINVAL)?;
    let pos = whence.with_offset(offset as i64).ok_or(SysError::EINVAL)?;
    let offset = file.seek(pos)?;
    Ok(offset as usize)
}

/// `dup()` makes the lowest-numbered free descriptor name the same open
/// file as `oldfd`.
///
/// # Tips
/// - Both descriptors share offset and access mode.
/// - The new descriptor is not close-on-exec.
pub fn sys_dup(task: &Task, oldfd: Fd) -> SyscallResult {
    log::info!("[sys_dup] task {}, oldfd: {oldfd}", task.tid());
    task.with_mut_fd_table(|table| table.dup(oldfd))
}

/// `dup2()` makes `newfd` name the same open file as `oldfd`.
///
/// # Tips
/// - If `newfd` was open it is closed and rebound in one step, so no other
///   thread sharing the table ever sees it empty. The displaced open file
///   is released after the table lock is dropped.
/// - If `oldfd` is not valid, the call fails and `newfd` is untouched.
/// - If `oldfd` is valid and equal to `newfd`, nothing happens.
pub fn sys_dup2(task: &Task, oldfd: Fd, newfd: Fd) -> SyscallResult {
    log::info!("[sys_dup2] task {}, oldfd: {oldfd}, newfd: {newfd}", task.tid());
    let displaced = task.with_mut_fd_table(|table| {
        if oldfd == newfd {
            table.get(oldfd)?;
            return Ok(None);
        }
        table.dup_to(oldfd, newfd, FdFlags::empty())
    })?;
    drop(displaced);
    Ok(newfd)
}

/// `dup3()` is `dup2()` with two differences: `oldfd == newfd` fails with
/// `EINVAL`, and `O_CLOEXEC` in `flags` marks `newfd` close-on-exec. Any
/// other flag fails with `EINVAL`.
pub fn sys_dup3(task: &Task, oldfd: Fd, newfd: Fd, flags: i32) -> SyscallResult {
    log::info!(
        "[sys_dup3] task {}, oldfd: {oldfd}, newfd: {newfd}, flags: {flags:#o}",
        task.tid()
    );
    if oldfd == newfd || flags & !OpenFlags::O_CLOEXEC.bits() != 0 {
        return Err(SysError::EINVAL);
    }
    let flags = FdFlags::from(OpenFlags::from_bits_truncate(flags));
    let displaced = task.with_mut_fd_table(|table| table.dup_to(oldfd, newfd, flags))?;
    drop(displaced);
    Ok(newfd)
}
