use super::SpinNoIrqLock;
use alloc::sync::Arc;

/// A lock shared by several owners, e.g. a descriptor table shared by the
/// threads of one process.
pub type ShareMutex<T> = Arc<SpinNoIrqLock<T>>;

pub fn new_share_mutex<T>(data: T) -> ShareMutex<T> {
    Arc::new(SpinNoIrqLock::new(data))
}
