mod queuebuffer;

use alloc::{sync::Arc, vec::Vec};

use config::inode::InodeMode;
use mutex::SpinNoIrqLock;
use spin::Once;
use systype::SyscallResult;
use vfs::Vnode;

use queuebuffer::QueueBuffer;

/// The system console, once the platform has brought it up.
pub static TTY: Once<Arc<Tty>> = Once::new();

/// Creates the console on first call and returns it.
pub fn init() -> Arc<Tty> {
    TTY.call_once(Tty::new).clone()
}

/// Console device. Input arrives from the platform through
/// [`Tty::push_input`]; output is queued until the platform drains it with
/// [`Tty::take_output`].
///
/// The console is a stream, so positions mean nothing here.
pub struct Tty {
    input: SpinNoIrqLock<QueueBuffer>,
    output: SpinNoIrqLock<Vec<u8>>,
}

impl Tty {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            input: SpinNoIrqLock::new(QueueBuffer::new()),
            output: SpinNoIrqLock::new(Vec::new()),
        })
    }

    /// Queues received bytes. Returns how many fit.
    pub fn push_input(&self, bytes: &[u8]) -> usize {
        let mut input = self.input.lock();
        bytes.iter().take_while(|b| input.push(**b)).count()
    }

    pub fn has_input(&self) -> bool {
        !self.input.lock().is_empty()
    }

    /// Takes everything written so far.
    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut *self.output.lock())
    }
}

impl Vnode for Tty {
    fn mode(&self) -> InodeMode {
        InodeMode::CHAR | InodeMode::from_bits_truncate(0o620)
    }

    fn size(&self) -> usize {
        0
    }

    /// Returns what is queued right now, which may be nothing.
    fn read_at(&self, _offset: usize, buf: &mut [u8]) -> SyscallResult {
        let mut input = self.input.lock();
        let mut count = 0;
        while count < buf.len() {
            match input.pop() {
                Some(ch) => {
                    buf[count] = if ch == b'\r' { b'\n' } else { ch };
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn write_at(&self, _offset: usize, buf: &[u8]) -> SyscallResult {
        self.output.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
