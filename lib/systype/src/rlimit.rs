/// Resource Limit
///
/// `rlim_cur` is the soft limit the kernel enforces. For a descriptor
/// table it is the number of usable slots, so descriptors at or beyond
/// `rlim_cur` are out of range.
///
/// `rlim_max` is the hard limit, the ceiling for `rlim_cur`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct RLimit {
    /// Soft limit: the kernel enforces for the corresponding resource
    pub rlim_cur: usize,
    /// Hard limit (ceiling for rlim_cur)
    pub rlim_max: usize,
}

impl RLimit {
    /// A limit whose soft and hard values are both `limit`.
    pub fn fixed(limit: usize) -> Self {
        Self {
            rlim_cur: limit,
            rlim_max: limit,
        }
    }
}
