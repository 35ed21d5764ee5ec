//! Spin based locks used across the kernel.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod mutex;

pub use mutex::*;
