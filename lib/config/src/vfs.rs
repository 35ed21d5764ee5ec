use strum::FromRepr;

bitflags::bitflags! {
    /// This is a bitmask of flags that can be passed to the `open` syscall as parameter
    /// `flags`. It modifies the behavior when accessing and creating the file it opens.
    ///
    /// There are 3 types of flags:
    ///
    /// - File access modes are O_RDONLY, O_WRONLY, and O_RDWR.
    /// - File creation flags are O_CLOEXEC, O_CREAT, O_DIRECTORY, O_EXCL, O_NOCTTY,
    ///   O_NOFOLLOW, and O_TRUNC.
    /// - Other flags are file status flags.
    ///
    /// Defined in <bits/fcntl-linux.h>. See `man 2 open` for more information.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: i32 {
        /* File access modes. */

        // Note: `bitflags` crate do not encourage zero bit flag, we should not directly
        // check `O_RDONLY`. Call `readable()` instead.
        const O_RDONLY      = 0;
        const O_WRONLY      = 1;
        const O_RDWR        = 2;

        /* File creation flags. */
        const O_CREAT       = 0o100;
        const O_EXCL        = 0o200;
        const O_NOCTTY      = 0o400;
        const O_TRUNC       = 0o1000;
        const O_DIRECTORY   = 0o200000;
        const O_NOFOLLOW    = 0o400000;
        const O_CLOEXEC     = 0o2000000;

        /* File status flags. */
        const O_APPEND      = 0o2000;
        const O_NONBLOCK    = 0o4000;
        const O_DSYNC       = 0o10000;
        const O_LARGEFILE   = 0o100000;
        const O_NOATIME     = 0o1000000;
        const O_SYNC        = 0o4010000;
    }
}

impl OpenFlags {
    /// Bitmask of access modes.
    pub const ACCESS_MODE: Self = Self::O_RDONLY.union(Self::O_WRONLY).union(Self::O_RDWR);

    /// A file `open`ed with this flags can be read.
    pub fn readable(&self) -> bool {
        // Not being write-only means it is readable.
        !self.contains(Self::O_WRONLY)
    }

    /// A file `open`ed with this flags can be written.
    pub fn writable(&self) -> bool {
        // Being read-write or write-only means it is writable.
        self.contains(Self::O_RDWR) || self.contains(Self::O_WRONLY)
    }

    /// Returns the access mode of the file.
    pub fn access_mode(&self) -> Self {
        self.intersection(Self::ACCESS_MODE)
    }

    /// `O_WRONLY | O_RDWR` names no access mode at all.
    pub fn has_valid_access_mode(&self) -> bool {
        self.access_mode() != Self::ACCESS_MODE
    }
}

/// Enumeration of possible methods to seek within an I/O object.
///
/// Copied from `std`.
#[derive(Copy, PartialEq, Eq, Clone, Debug)]
pub enum SeekFrom {
    /// Sets the offset to the provided number of bytes.
    Start(u64),

    /// Sets the offset to the size of this object plus the specified number of
    /// bytes.
    ///
    /// It is possible to seek beyond the end of an object, but it's an error to
    /// seek before byte 0.
    End(i64),

    /// Sets the offset to the current position plus the specified number of
    /// bytes.
    ///
    /// It is possible to seek beyond the end of an object, but it's an error to
    /// seek before byte 0.
    Current(i64),
}

/// The `whence` argument of `lseek`.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Whence {
    Set = 0,
    Cur = 1,
    End = 2,
}

impl Whence {
    /// Pairs `whence` with the user supplied offset. A negative absolute
    /// position has no `SeekFrom` form and yields `None`.
    pub fn with_offset(self, offset: i64) -> Option<SeekFrom> {
        match self {
            Whence::Set => u64::try_from(offset).ok().map(SeekFrom::Start),
            Whence::Cur => Some(SeekFrom::Current(offset)),
            Whence::End => Some(SeekFrom::End(offset)),
        }
    }
}
