pub(crate) const QUEUE_BUFFER_LEN: usize = 256;

/// Fixed-size byte ring. Pushing into a full ring drops the byte.
pub(crate) struct QueueBuffer {
    buf: [u8; QUEUE_BUFFER_LEN],
    head: usize,
    len: usize,
}

impl QueueBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; QUEUE_BUFFER_LEN],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, val: u8) -> bool {
        if self.len == QUEUE_BUFFER_LEN {
            return false;
        }
        self.buf[(self.head + self.len) % QUEUE_BUFFER_LEN] = val;
        self.len += 1;
        true
    }

    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let ret = self.buf[self.head];
        self.head = (self.head + 1) % QUEUE_BUFFER_LEN;
        self.len -= 1;
        Some(ret)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
