use core::fmt::{self, Write};

use mutex::SpinNoIrqLock;
use osfs::dev::tty::TTY;
use vfs::Vnode;

static PRINT_LOCK: SpinNoIrqLock<()> = SpinNoIrqLock::new(());

struct Stdout;

impl Write for Stdout {
    /// Output before the console exists is dropped.
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(tty) = TTY.get() {
            tty.write_at(0, s.as_bytes()).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

pub fn print(args: fmt::Arguments) {
    let _guard = PRINT_LOCK.lock();
    Stdout.write_fmt(args).ok();
}

#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!($fmt $(, $($arg)+)?))
    }
}

#[macro_export]
macro_rules! println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?))
    }
}
