use alloc::{sync::Arc, vec::Vec};
use core::mem;

use config::{process::CloneFlags, vfs::OpenFlags};
use mutex::{ShareMutex, SpinNoIrqLock, new_share_mutex};
use osfs::{FdInfo, FdTable, OpenFile};
use systype::SysResult;
use vfs::{FileSystem, Vnode};

use super::tid::{Tid, TidHandle, tid_alloc};

/// The part of a task the file syscalls work on: its id, its descriptor
/// table and the filesystem that `open` resolves paths against.
///
/// Tasks created with [`CloneFlags::FILES`] share one table object, so
/// every table operation goes through the table's own lock. The outer lock
/// only guards which table this task points at, and is never held while
/// the table itself is locked.
pub struct Task {
    tid: TidHandle,
    fd_table: SpinNoIrqLock<ShareMutex<FdTable>>,
    fs: Arc<dyn FileSystem>,
}

impl Task {
    fn build(fs: Arc<dyn FileSystem>, fd_table: FdTable) -> SysResult<Arc<Self>> {
        let tid = tid_alloc()?;
        log::info!("[Task::build] new task {}", tid.tid());
        Ok(Arc::new(Self {
            tid,
            fd_table: SpinNoIrqLock::new(new_share_mutex(fd_table)),
            fs,
        }))
    }

    /// A task with an empty descriptor table.
    pub fn new(fs: Arc<dyn FileSystem>) -> SysResult<Arc<Self>> {
        Self::build(fs, FdTable::new())
    }

    /// A task whose stdin, stdout and stderr share one read-write open
    /// file over `console`.
    pub fn new_with_stdio(
        fs: Arc<dyn FileSystem>,
        console: Arc<dyn Vnode>,
    ) -> SysResult<Arc<Self>> {
        let stdio = OpenFile::new(console, OpenFlags::O_RDWR);
        Self::build(fs, FdTable::with_stdio(stdio))
    }

    pub fn tid(&self) -> Tid {
        self.tid.tid()
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// The table object this task currently uses.
    pub fn fd_table(&self) -> ShareMutex<FdTable> {
        self.fd_table.lock().clone()
    }

    /// Runs `f` with the table locked. Keep `f` short and drop any entries
    /// it hands back only after this returns.
    pub fn with_mut_fd_table<T>(&self, f: impl FnOnce(&mut FdTable) -> T) -> T {
        let table = self.fd_table();
        let mut guard = table.lock();
        f(&mut guard)
    }

    pub fn shares_fd_table_with(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.fd_table(), &other.fd_table())
    }

    /// Creates a child task.
    ///
    /// With [`CloneFlags::FILES`] the child uses this task's table object.
    /// Otherwise it gets a copy taken under this table's lock, in which
    /// every descriptor names the same open file as here.
    pub fn fork(&self, cloneflags: CloneFlags) -> SysResult<Arc<Self>> {
        let tid = tid_alloc()?;
        let fd_table = if cloneflags.contains(CloneFlags::FILES) {
            self.fd_table()
        } else {
            new_share_mutex(self.fd_table().lock().clone())
        };
        log::info!(
            "[Task::fork] task {} forks {} with flags {:?}",
            self.tid(),
            tid.tid(),
            cloneflags
        );
        Ok(Arc::new(Self {
            tid,
            fd_table: SpinNoIrqLock::new(fd_table),
            fs: self.fs.clone(),
        }))
    }

    /// Closes every descriptor marked close-on-exec.
    pub fn exec_close_on_exec(&self) {
        let closed = self.with_mut_fd_table(|table| table.close_on_exec());
        log::debug!(
            "[Task::exec_close_on_exec] task {} closed {} descriptors",
            self.tid(),
            closed.len()
        );
    }

    /// Gives up this task's share of its descriptor table and leaves it
    /// with an empty private one. Calling it again is harmless.
    ///
    /// The task that gives up the last share closes every live slot, even if
    /// the other sharers have exited without being dropped yet.
    pub fn exit(&self) {
        let table = mem::replace(
            &mut *self.fd_table.lock(),
            new_share_mutex(FdTable::new()),
        );
        let Some(table) = Arc::into_inner(table) else {
            log::debug!("[Task::exit] task {} leaves a shared table", self.tid());
            return;
        };
        let closed: Vec<FdInfo> = table.into_inner().clear();
        log::info!(
            "[Task::exit] task {} closed {} descriptors",
            self.tid(),
            closed.len()
        );
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        log::trace!("[Task::drop] task {}", self.tid());
    }
}
