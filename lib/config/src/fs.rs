/// Per-process descriptor table capacity.
pub const OPEN_MAX: usize = 128;

/// Longest path `open` accepts, in bytes.
pub const PATH_MAX: usize = 4096;

/// Largest size a file on the in-memory filesystem may grow to.
pub const MAX_FILE_SIZE: usize = 1 << 30;

pub const STDIN: usize = 0;
pub const STDOUT: usize = 1;
pub const STDERR: usize = 2;
