use alloc::sync::Arc;
use core::fmt::Debug;

use config::vfs::{OpenFlags, SeekFrom};
use mutex::SpinLock;
use systype::{SysError, SysResult, SyscallResult};
use vfs::Vnode;

/// Access state of one open instance of a file.
///
/// The offset never goes negative; it moves only through a successful
/// read or write, or through an explicit seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePointer {
    offset: i64,
    readable: bool,
    writable: bool,
    append: bool,
}

impl FilePointer {
    pub fn new(flags: OpenFlags) -> Self {
        Self {
            offset: 0,
            readable: flags.readable(),
            writable: flags.writable(),
            append: flags.contains(OpenFlags::O_APPEND),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn readable(&self) -> bool {
        self.readable
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub fn append(&self) -> bool {
        self.append
    }

    fn advance(&mut self, count: usize) -> SysResult<()> {
        let count = i64::try_from(count).map_err(|_| SysError::EOVERFLOW)?;
        self.offset = self
            .offset
            .checked_add(count)
            .ok_or(SysError::EOVERFLOW)?;
        Ok(())
    }
}

/// An open file description: one [`FilePointer`] bound to one vnode.
///
/// `OpenFile` only lives behind an `Arc`. Every descriptor slot that names
/// it, in any process, owns one strong reference, and so does a syscall
/// while it works on the file. Cloning the `Arc` is `acquire`, dropping it
/// is `release`, and the vnode reference goes back to the filesystem when
/// the last one is dropped.
pub struct OpenFile {
    vnode: Arc<dyn Vnode>,
    flags: OpenFlags,
    /// Held across the vnode call in `read`/`write`/`seek` on seekable files
    /// so that two users of a shared description never interleave an offset
    /// update.
    pointer: SpinLock<FilePointer>,
}

impl OpenFile {
    /// Wraps a vnode reference obtained from the filesystem. The new file
    /// starts at offset 0 with a reference count of 1.
    pub fn new(vnode: Arc<dyn Vnode>, flags: OpenFlags) -> Arc<Self> {
        Arc::new(Self {
            vnode,
            flags,
            pointer: SpinLock::new(FilePointer::new(flags)),
        })
    }

    /// Takes one more reference for a second slot.
    pub fn acquire(self: &Arc<Self>) -> Arc<Self> {
        Arc::clone(self)
    }

    /// Gives one reference back. Returns `true` when this was the last one
    /// and the file has been destroyed.
    ///
    /// The decrement and the destroy decision are a single atomic step, so a
    /// racing `acquire` can only ever run on a handle that still counts.
    pub fn release(self: Arc<Self>) -> bool {
        match Arc::into_inner(self) {
            Some(file) => {
                drop(file);
                true
            }
            None => false,
        }
    }

    /// Number of live references: descriptor slots plus in-flight syscalls.
    pub fn ref_count(self: &Arc<Self>) -> usize {
        Arc::strong_count(self)
    }

    pub fn vnode(&self) -> &Arc<dyn Vnode> {
        &self.vnode
    }

    /// Flags given to `open`.
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn pointer(&self) -> FilePointer {
        *self.pointer.lock()
    }

    pub fn offset(&self) -> i64 {
        self.pointer.lock().offset
    }

    /// Reads from the current offset and advances it by the count actually
    /// read. A short count, including 0 at end of file, is not an error.
    ///
    /// Streams ignore the offset: they are read at 0 without taking the
    /// pointer lock, so a blocking device never stalls another user on it.
    pub fn read(&self, buf: &mut [u8]) -> SyscallResult {
        if !self.flags.readable() {
            log::warn!("[OpenFile::read] file not opened for reading");
            return Err(SysError::EBADF);
        }
        if !self.vnode.is_seekable() {
            return self.vnode.read_at(0, buf);
        }
        let mut pointer = self.pointer.lock();
        let count = self.vnode.read_at(pointer.offset as usize, buf)?;
        pointer.advance(count)?;
        log::trace!("[OpenFile::read] count {count}, offset now {}", pointer.offset);
        Ok(count)
    }

    /// Writes at the current offset, or at the end of the file in append
    /// mode, and advances the offset by the count actually written.
    pub fn write(&self, buf: &[u8]) -> SyscallResult {
        if !self.flags.writable() {
            log::warn!("[OpenFile::write] file not opened for writing");
            return Err(SysError::EBADF);
        }
        if !self.vnode.is_seekable() {
            return self.vnode.write_at(0, buf);
        }
        let mut pointer = self.pointer.lock();
        if pointer.append {
            pointer.offset = i64::try_from(self.vnode.size()).map_err(|_| SysError::EFBIG)?;
        }
        let count = self.vnode.write_at(pointer.offset as usize, buf)?;
        pointer.advance(count)?;
        log::trace!("[OpenFile::write] count {count}, offset now {}", pointer.offset);
        Ok(count)
    }

    /// Moves the offset and returns the new value.
    ///
    /// Seeking past the end of the file is allowed and does not change its
    /// size. A target before byte 0 fails with `EINVAL`, and streams fail
    /// with `ESPIPE`.
    pub fn seek(&self, pos: SeekFrom) -> SysResult<i64> {
        if !self.vnode.is_seekable() {
            return Err(SysError::ESPIPE);
        }
        let mut pointer = self.pointer.lock();
        let new_offset = match pos {
            SeekFrom::Start(off) => i64::try_from(off).map_err(|_| SysError::EINVAL)?,
            SeekFrom::Current(off) => pointer
                .offset
                .checked_add(off)
                .ok_or(SysError::EOVERFLOW)?,
            SeekFrom::End(off) => i64::try_from(self.vnode.size())
                .map_err(|_| SysError::EOVERFLOW)?
                .checked_add(off)
                .ok_or(SysError::EOVERFLOW)?,
        };
        if new_offset < 0 {
            return Err(SysError::EINVAL);
        }
        pointer.offset = new_offset;
        Ok(new_offset)
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        log::debug!(
            "[OpenFile::drop] last reference gone, releasing {:?} vnode",
            self.vnode.vtype()
        );
    }
}

impl Debug for OpenFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "OpenFile [{:?}] flags [{:?}] pointer [{:?}]",
            self.vnode.vtype(),
            self.flags,
            self.pointer()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, vec, vec::Vec};

    use config::inode::InodeMode;

    use super::*;
    use crate::{dev::tty::Tty, simple::SimpleVnode};

    fn file_with(data: &[u8], flags: OpenFlags) -> (Arc<SimpleVnode>, Arc<OpenFile>) {
        let vnode = SimpleVnode::new_file(InodeMode::from_bits_truncate(0o644));
        vnode.write_at(0, data).unwrap();
        let file = OpenFile::new(vnode.clone(), flags);
        (vnode, file)
    }

    #[test]
    fn pointer_flags_follow_access_mode() {
        let ro = FilePointer::new(OpenFlags::O_RDONLY);
        assert!(ro.readable() && !ro.writable());
        let wo = FilePointer::new(OpenFlags::O_WRONLY);
        assert!(!wo.readable() && wo.writable());
        let rw = FilePointer::new(OpenFlags::O_RDWR | OpenFlags::O_APPEND);
        assert!(rw.readable() && rw.writable() && rw.append());
        assert_eq!(rw.offset(), 0);
    }

    #[test]
    fn read_advances_by_bytes_read() {
        let (_, file) = file_with(b"hello world", OpenFlags::O_RDONLY);
        let mut buf = [0u8; 5];
        assert_eq!(file.read(&mut buf), Ok(5));
        assert_eq!(&buf, b"hello");
        assert_eq!(file.offset(), 5);

        let mut rest = [0u8; 32];
        assert_eq!(file.read(&mut rest), Ok(6));
        assert_eq!(file.offset(), 11);
        assert_eq!(file.read(&mut rest), Ok(0));
        assert_eq!(file.offset(), 11);
    }

    #[test]
    fn access_flags_are_enforced() {
        let (_, wo) = file_with(b"abc", OpenFlags::O_WRONLY);
        assert_eq!(wo.read(&mut [0u8; 3]), Err(SysError::EBADF));
        let (_, ro) = file_with(b"abc", OpenFlags::O_RDONLY);
        assert_eq!(ro.write(b"x"), Err(SysError::EBADF));
        assert_eq!(ro.offset(), 0);
    }

    #[test]
    fn append_writes_land_at_end() {
        let (vnode, file) = file_with(b"abc", OpenFlags::O_WRONLY | OpenFlags::O_APPEND);
        assert_eq!(file.write(b"de"), Ok(2));
        assert_eq!(file.offset(), 5);
        let mut buf = [0u8; 8];
        let n = vnode.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"abcde");
    }

    #[test]
    fn seek_policy() {
        let (_, file) = file_with(b"0123456789", OpenFlags::O_RDWR);
        assert_eq!(file.seek(SeekFrom::Start(4)), Ok(4));
        assert_eq!(file.seek(SeekFrom::Current(-2)), Ok(2));
        assert_eq!(file.seek(SeekFrom::End(-1)), Ok(9));
        // Past the end is allowed and leaves the size alone.
        assert_eq!(file.seek(SeekFrom::End(5)), Ok(15));
        assert_eq!(file.vnode().size(), 10);
        assert_eq!(file.read(&mut [0u8; 4]), Ok(0));
        // Before byte 0 is rejected and the offset is kept.
        assert_eq!(file.seek(SeekFrom::Current(-100)), Err(SysError::EINVAL));
        assert_eq!(file.offset(), 15);
        assert_eq!(
            file.seek(SeekFrom::Current(i64::MAX)),
            Err(SysError::EOVERFLOW)
        );
    }

    #[test]
    fn streams_refuse_seek_and_keep_offset() {
        let tty = Tty::new();
        tty.push_input(b"hi");
        let file = OpenFile::new(tty.clone(), OpenFlags::O_RDWR);
        assert_eq!(file.seek(SeekFrom::Start(0)), Err(SysError::ESPIPE));
        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf), Ok(2));
        assert_eq!(file.write(b"ok"), Ok(2));
        assert_eq!(file.offset(), 0);
        assert_eq!(tty.take_output(), b"ok".to_vec());
    }

    #[test]
    fn stream_io_does_not_wait_on_the_pointer_lock() {
        let tty = Tty::new();
        tty.push_input(b"in");
        let file = OpenFile::new(tty.clone(), OpenFlags::O_RDWR);
        let other = file.acquire();
        let _busy = file.pointer.lock();
        let mut buf = [0u8; 4];
        assert_eq!(other.read(&mut buf), Ok(2));
        assert_eq!(other.write(b"out"), Ok(3));
        assert_eq!(tty.take_output(), b"out".to_vec());
    }

    #[test]
    fn release_destroys_on_last_reference() {
        let (vnode, file) = file_with(b"", OpenFlags::O_RDONLY);
        let vnode_refs = Arc::strong_count(&vnode);
        let second = file.acquire();
        assert_eq!(file.ref_count(), 2);
        assert!(!second.release());
        assert_eq!(file.ref_count(), 1);
        assert!(file.release());
        assert_eq!(Arc::strong_count(&vnode), vnode_refs - 1);
    }

    #[test]
    fn concurrent_writers_never_overlap() {
        let (vnode, file) = file_with(b"", OpenFlags::O_WRONLY);
        let handles: Vec<_> = (0..4u8)
            .map(|id| {
                let file = file.acquire();
                thread::spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(file.write(&[id; 4]), Ok(4));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(file.offset(), 4 * 50 * 4);
        let mut data = vec![0u8; 800];
        assert_eq!(vnode.read_at(0, &mut data), Ok(800));
        for chunk in data.chunks(4) {
            assert!(chunk.iter().all(|b| *b == chunk[0]));
        }
    }
}
