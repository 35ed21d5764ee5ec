//! Kernel-wide result and error types shared by every subsystem crate.

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod rlimit;

pub use error::{SysError, SysResult, SyscallResult, syscall_ret};
