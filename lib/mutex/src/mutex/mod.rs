use spin_mutex::SpinMutex;

#[cfg(target_arch = "loongarch64")]
use loongArch64::register::crmd;
#[cfg(target_arch = "riscv64")]
use riscv::register::sstatus;

pub mod share_mutex;
pub mod spin_mutex;

pub use share_mutex::{ShareMutex, new_share_mutex};

pub type SpinLock<T> = SpinMutex<T, Spin>;
pub type SpinNoIrqLock<T> = SpinMutex<T, SpinNoIrq>;

/// Low-level support for mutex(spinlock, sleeplock, etc)
pub trait MutexSupport {
    /// Guard data
    type GuardData;
    /// Called before lock() & try_lock()
    fn before_lock() -> Self::GuardData;
    /// Called when MutexGuard dropping
    fn after_unlock(_: &mut Self::GuardData);
}

/// Spin MutexSupport
#[derive(Debug)]
pub struct Spin;

impl MutexSupport for Spin {
    type GuardData = ();
    #[inline(always)]
    fn before_lock() -> Self::GuardData {}
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}

/// Keeps supervisor interrupts disabled while alive and restores the
/// previous enable bit on drop.
///
/// Targets without a supervisor interrupt bit (hosted builds) record
/// `false` and never touch hardware state.
pub struct SieGuard(bool);

impl SieGuard {
    fn new() -> Self {
        #[cfg(target_arch = "riscv64")]
        let old_ie = {
            let sie = sstatus::read().sie();
            unsafe {
                sstatus::clear_sie();
            }
            sie
        };
        #[cfg(target_arch = "loongarch64")]
        let old_ie = {
            let ie = crmd::read().ie();
            crmd::set_ie(false);
            ie
        };
        #[cfg(not(any(target_arch = "riscv64", target_arch = "loongarch64")))]
        let old_ie = false;
        Self(old_ie)
    }
}

impl Drop for SieGuard {
    fn drop(&mut self) {
        if self.0 {
            #[cfg(target_arch = "riscv64")]
            unsafe {
                sstatus::set_sie();
            }
            #[cfg(target_arch = "loongarch64")]
            crmd::set_ie(true);
        }
    }
}

/// SpinNoIrq MutexSupport
#[derive(Debug)]
pub struct SpinNoIrq;

impl MutexSupport for SpinNoIrq {
    type GuardData = SieGuard;
    #[inline(always)]
    fn before_lock() -> Self::GuardData {
        SieGuard::new()
    }
    #[inline(always)]
    fn after_unlock(_: &mut Self::GuardData) {}
}
