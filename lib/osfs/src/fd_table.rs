use alloc::{sync::Arc, vec::Vec};
use core::fmt::Debug;

use config::{
    fs::{OPEN_MAX, STDERR, STDIN, STDOUT},
    vfs::OpenFlags,
};
use systype::{
    error::{SysError, SysResult},
    rlimit::RLimit,
};

use crate::file::OpenFile;

pub type Fd = usize;

/// One occupied descriptor slot: a reference to an open file plus the
/// per-descriptor flags.
#[derive(Clone)]
pub struct FdInfo {
    file: Arc<OpenFile>,
    flags: FdFlags,
}

/// A process's descriptor table.
///
/// Slots hold `Option<FdInfo>`; the vector grows lazily up to the soft
/// limit, which never exceeds [`OPEN_MAX`]. Cloning the table is
/// `duplicate_table`: every occupied slot's reference is copied, which
/// bumps each open file's count once per slot, and no open file is copied.
#[derive(Clone)]
pub struct FdTable {
    table: Vec<Option<FdInfo>>,
    rlimit: RLimit,
}

impl FdInfo {
    pub fn new(file: Arc<OpenFile>, flags: FdFlags) -> Self {
        Self { file, flags }
    }

    /// A new reference to the open file, for use outside the table lock.
    pub fn file(&self) -> Arc<OpenFile> {
        self.file.acquire()
    }

    pub fn flags(&self) -> FdFlags {
        self.flags
    }
}

impl FdTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            table: Vec::new(),
            rlimit: RLimit::fixed(OPEN_MAX),
        }
    }

    /// A table whose stdin, stdout and stderr all name `console`.
    pub fn with_stdio(console: Arc<OpenFile>) -> Self {
        let mut table = Self::new();
        for fd in [STDIN, STDOUT, STDERR] {
            table.table.push(Some(FdInfo::new(console.acquire(), FdFlags::empty())));
            debug_assert_eq!(table.table.len(), fd + 1);
        }
        table
    }

    /// Number of usable slots.
    pub fn capacity(&self) -> usize {
        self.rlimit.rlim_cur
    }

    /// Number of occupied slots.
    pub fn open_count(&self) -> usize {
        self.table.iter().filter(|slot| slot.is_some()).count()
    }

    fn get_available_slot(&mut self) -> Option<usize> {
        let free = self
            .table
            .iter()
            .enumerate()
            .take_while(|(i, _)| *i < self.rlimit.rlim_cur)
            .find(|(_, e)| e.is_none())
            .map(|(i, _)| i);

        if free.is_some() {
            return free;
        }
        let next = self.table.len();
        if next < self.rlimit.rlim_cur {
            self.extend_to(next + 1);
            Some(next)
        } else {
            None
        }
    }

    /// Finds the lowest-numbered empty slot without filling it.
    pub fn alloc_slot(&mut self) -> SysResult<Fd> {
        self.get_available_slot().ok_or(SysError::EMFILE)
    }

    /// Installs `file` in the lowest-numbered empty slot.
    ///
    /// On `EMFILE` the reference in `file` is dropped here, so a file that
    /// nobody else holds is destroyed before the error reaches the caller.
    pub fn alloc(&mut self, file: Arc<OpenFile>, flags: FdFlags) -> SysResult<Fd> {
        let fd = self.alloc_slot()?;
        log::debug!("alloc fd [{}]", fd);
        self.table[fd] = Some(FdInfo::new(file, flags));
        Ok(fd)
    }

    pub fn get(&self, fd: Fd) -> SysResult<&FdInfo> {
        self.table
            .get(fd)
            .ok_or(SysError::EBADF)?
            .as_ref()
            .ok_or(SysError::EBADF)
    }

    /// Resolves `fd` to a new reference to its open file.
    pub fn get_file(&self, fd: Fd) -> SysResult<Arc<OpenFile>> {
        Ok(self.get(fd)?.file())
    }

    /// Empties slot `fd` and hands its entry back, so the caller can drop
    /// the reference after letting go of the table lock.
    pub fn remove(&mut self, fd: Fd) -> SysResult<FdInfo> {
        self.table
            .get_mut(fd)
            .ok_or(SysError::EBADF)?
            .take()
            .ok_or(SysError::EBADF)
    }

    fn extend_to(&mut self, len: usize) {
        if self.table.len() < len {
            self.table.resize_with(len, || None);
        }
    }

    /// Installs `fd_info` at `fd`, returning whatever the slot held before.
    /// Replacing an occupied slot is a single step, so no other user of the
    /// table sees `fd` empty in between.
    pub fn put(&mut self, fd: Fd, fd_info: FdInfo) -> SysResult<Option<FdInfo>> {
        if fd >= self.rlimit.rlim_cur {
            return Err(SysError::EBADF);
        }
        self.extend_to(fd + 1);
        Ok(self.table[fd].replace(fd_info))
    }

    /// Shares `old_fd`'s open file through the lowest-numbered empty slot.
    pub fn dup(&mut self, old_fd: Fd) -> SysResult<Fd> {
        let file = self.get_file(old_fd)?;
        self.alloc(file, FdFlags::empty())
    }

    /// Makes `new_fd` name the same open file as `old_fd`.
    ///
    /// An occupied `new_fd` is closed and rebound in the same step and its
    /// previous entry is returned. Both descriptors share offset and access
    /// flags afterwards; `flags` become the descriptor flags of `new_fd`.
    pub fn dup_to(&mut self, old_fd: Fd, new_fd: Fd, flags: FdFlags) -> SysResult<Option<FdInfo>> {
        let file = self.get_file(old_fd)?;
        if new_fd >= self.rlimit.rlim_cur {
            return Err(SysError::EBADF);
        }
        log::debug!("[dup_to] old fd {old_fd}, new fd {new_fd}");
        self.put(new_fd, FdInfo::new(file, flags))
    }

    /// Empties every slot marked close-on-exec.
    pub fn close_on_exec(&mut self) -> Vec<FdInfo> {
        self.table
            .iter_mut()
            .filter(|slot| {
                slot.as_ref()
                    .is_some_and(|info| info.flags().contains(FdFlags::CLOEXEC))
            })
            .filter_map(Option::take)
            .collect()
    }

    /// Empties every slot, for process teardown.
    pub fn clear(&mut self) -> Vec<FdInfo> {
        let closed = self.table.drain(..).flatten().collect();
        self.table.shrink_to_fit();
        closed
    }

    /// Changes the soft limit. Descriptors already open above the new limit
    /// stay open; new ones are only handed out below it.
    pub fn set_rlimit(&mut self, rlimit: RLimit) -> SysResult<()> {
        if rlimit.rlim_cur > OPEN_MAX || rlimit.rlim_cur > rlimit.rlim_max {
            return Err(SysError::EINVAL);
        }
        self.rlimit = rlimit;
        Ok(())
    }

    pub fn get_rlimit(&self) -> RLimit {
        self.rlimit
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for FdInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?} with flags [{:?}]", self.file, self.flags)
    }
}

impl Debug for FdTable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.table
            .iter()
            .enumerate()
            .try_for_each(|(i, entry)| match entry {
                Some(file) => writeln!(f, "{}: {:?}", i, file),
                None => writeln!(f, "{}: <closed>", i),
            })
    }
}

bitflags::bitflags! {
    // Defined in <bits/fcntl-linux.h>.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FdFlags: u8 {
        const CLOEXEC = 1;
    }
}

impl From<OpenFlags> for FdFlags {
    fn from(value: OpenFlags) -> Self {
        if value.contains(OpenFlags::O_CLOEXEC) {
            FdFlags::CLOEXEC
        } else {
            FdFlags::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use config::{inode::InodeMode, vfs::SeekFrom};

    use super::*;
    use crate::simple::SimpleVnode;

    fn new_file(flags: OpenFlags) -> Arc<OpenFile> {
        let vnode = SimpleVnode::new_file(InodeMode::from_bits_truncate(0o644));
        OpenFile::new(vnode, flags)
    }

    #[test]
    fn alloc_uses_lowest_free_slot() {
        let mut table = FdTable::new();
        let a = new_file(OpenFlags::O_RDONLY);
        assert_eq!(table.alloc(a.acquire(), FdFlags::empty()), Ok(0));
        assert_eq!(table.alloc(a.acquire(), FdFlags::empty()), Ok(1));
        assert_eq!(table.alloc(a.acquire(), FdFlags::empty()), Ok(2));
        drop(table.remove(1).unwrap());
        assert_eq!(table.alloc_slot(), Ok(1));
        assert_eq!(table.alloc(a.acquire(), FdFlags::empty()), Ok(1));
        assert_eq!(table.alloc(a.acquire(), FdFlags::empty()), Ok(3));
        assert_eq!(a.ref_count(), 5);
        assert_eq!(table.open_count(), 4);
    }

    #[test]
    fn exhausted_table_reports_emfile_and_drops_file() {
        let mut table = FdTable::new();
        table.set_rlimit(RLimit::fixed(2)).unwrap();
        let kept = new_file(OpenFlags::O_RDONLY);
        table.alloc(kept.acquire(), FdFlags::empty()).unwrap();
        table.alloc(kept.acquire(), FdFlags::empty()).unwrap();

        let extra = new_file(OpenFlags::O_RDONLY);
        let vnode = extra.vnode().clone();
        assert_eq!(Arc::strong_count(&vnode), 2);
        assert_eq!(table.alloc(extra, FdFlags::empty()), Err(SysError::EMFILE));
        assert_eq!(Arc::strong_count(&vnode), 1);
    }

    #[test]
    fn full_capacity_is_open_max() {
        let mut table = FdTable::new();
        let file = new_file(OpenFlags::O_RDONLY);
        for fd in 0..OPEN_MAX {
            assert_eq!(table.alloc(file.acquire(), FdFlags::empty()), Ok(fd));
        }
        assert_eq!(table.alloc_slot(), Err(SysError::EMFILE));
        assert_eq!(file.ref_count(), OPEN_MAX + 1);
    }

    #[test]
    fn lookup_rejects_bad_descriptors() {
        let mut table = FdTable::new();
        assert_eq!(table.get_file(0).err(), Some(SysError::EBADF));
        table.alloc(new_file(OpenFlags::O_RDONLY), FdFlags::empty()).unwrap();
        assert!(table.get_file(0).is_ok());
        assert_eq!(table.get_file(5).err(), Some(SysError::EBADF));
        assert_eq!(table.get_file(OPEN_MAX).err(), Some(SysError::EBADF));
        assert_eq!(table.get(usize::MAX).err(), Some(SysError::EBADF));
        assert_eq!(table.remove(7).err(), Some(SysError::EBADF));
    }

    #[test]
    fn remove_releases_one_reference() {
        let mut table = FdTable::new();
        let file = new_file(OpenFlags::O_RDONLY);
        table.alloc(file.acquire(), FdFlags::empty()).unwrap();
        assert_eq!(file.ref_count(), 2);
        drop(table.remove(0).unwrap());
        assert_eq!(file.ref_count(), 1);
        assert_eq!(table.remove(0).err(), Some(SysError::EBADF));
    }

    #[test]
    fn dup_to_replaces_occupied_slot() {
        let mut table = FdTable::new();
        let a = new_file(OpenFlags::O_RDWR);
        let b = new_file(OpenFlags::O_RDWR);
        table.alloc(a.acquire(), FdFlags::empty()).unwrap();
        table.alloc(b.acquire(), FdFlags::CLOEXEC).unwrap();

        let displaced = table.dup_to(0, 1, FdFlags::empty()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&displaced.file(), &b));
        drop(displaced);
        assert_eq!(b.ref_count(), 1);
        assert_eq!(a.ref_count(), 3);
        assert!(Arc::ptr_eq(&table.get_file(1).unwrap(), &a));
        assert_eq!(table.get(1).unwrap().flags(), FdFlags::empty());

        a.seek(SeekFrom::Start(3)).unwrap();
        assert_eq!(table.get_file(1).unwrap().offset(), 3);
    }

    #[test]
    fn dup_to_rejects_out_of_range_target() {
        let mut table = FdTable::new();
        let a = new_file(OpenFlags::O_RDWR);
        table.alloc(a.acquire(), FdFlags::empty()).unwrap();
        assert_eq!(
            table.dup_to(0, OPEN_MAX, FdFlags::empty()).err(),
            Some(SysError::EBADF)
        );
        assert_eq!(table.dup_to(3, 4, FdFlags::empty()).err(), Some(SysError::EBADF));
        assert_eq!(a.ref_count(), 2);
    }

    #[test]
    fn clone_duplicates_references_not_files() {
        let mut parent = FdTable::new();
        let file = new_file(OpenFlags::O_RDWR);
        parent.alloc(file.acquire(), FdFlags::empty()).unwrap();
        parent.dup(0).unwrap();
        assert_eq!(file.ref_count(), 3);

        let mut child = parent.clone();
        assert_eq!(file.ref_count(), 5);
        assert!(Arc::ptr_eq(&child.get_file(1).unwrap(), &file));

        drop(child.remove(0).unwrap());
        assert!(parent.get_file(0).is_ok());
        assert_eq!(file.ref_count(), 4);

        drop(child.clear());
        assert_eq!(child.open_count(), 0);
        assert_eq!(file.ref_count(), 3);
    }

    #[test]
    fn close_on_exec_only_takes_marked_slots() {
        let mut table = FdTable::new();
        let file = new_file(OpenFlags::O_RDONLY);
        table.alloc(file.acquire(), FdFlags::empty()).unwrap();
        table
            .alloc(file.acquire(), FdFlags::from(OpenFlags::O_CLOEXEC))
            .unwrap();
        table.alloc(file.acquire(), FdFlags::empty()).unwrap();

        let closed = table.close_on_exec();
        assert_eq!(closed.len(), 1);
        drop(closed);
        assert!(table.get(0).is_ok());
        assert_eq!(table.get(1).err(), Some(SysError::EBADF));
        assert!(table.get(2).is_ok());
        assert_eq!(file.ref_count(), 3);
    }

    #[test]
    fn stdio_shares_one_console_file() {
        let console = new_file(OpenFlags::O_RDWR);
        let table = FdTable::with_stdio(console.acquire());
        assert_eq!(table.open_count(), 3);
        assert_eq!(console.ref_count(), 4);
        for fd in [STDIN, STDOUT, STDERR] {
            assert!(Arc::ptr_eq(&table.get_file(fd).unwrap(), &console));
        }
    }

    #[test]
    fn rlimit_is_capped_by_open_max() {
        let mut table = FdTable::new();
        assert_eq!(table.capacity(), OPEN_MAX);
        assert_eq!(
            table.set_rlimit(RLimit::fixed(OPEN_MAX + 1)),
            Err(SysError::EINVAL)
        );
        table.set_rlimit(RLimit::fixed(4)).unwrap();
        assert_eq!(table.get_rlimit().rlim_cur, 4);
        let file = new_file(OpenFlags::O_RDONLY);
        assert_eq!(
            table.put(4, FdInfo::new(file, FdFlags::empty())).err(),
            Some(SysError::EBADF)
        );
    }
}
