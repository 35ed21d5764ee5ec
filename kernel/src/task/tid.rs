use config::process::INIT_PROC_ID;
use id_allocator::{IdAllocator, VecIdAllocator};
use lazy_static::lazy_static;
use mutex::SpinNoIrqLock;
use systype::{SysError, SysResult};

type TidAllocator = VecIdAllocator;

lazy_static! {
    static ref TID_ALLOCATOR: SpinNoIrqLock<TidAllocator> =
        SpinNoIrqLock::new(TidAllocator::new(INIT_PROC_ID, usize::MAX));
}

pub type Tid = usize;

/// Owns one task id; the id is recycled when the handle drops.
#[derive(Debug)]
pub struct TidHandle(Tid);

impl TidHandle {
    pub fn tid(&self) -> Tid {
        self.0
    }
}

impl Drop for TidHandle {
    fn drop(&mut self) {
        unsafe { TID_ALLOCATOR.lock().dealloc(self.0) };
    }
}

/// Reuses a recycled id if there is one, otherwise takes the next fresh
/// id counting up from [`INIT_PROC_ID`].
pub fn tid_alloc() -> SysResult<TidHandle> {
    TID_ALLOCATOR
        .lock()
        .alloc()
        .map(TidHandle)
        .ok_or(SysError::EAGAIN)
}
