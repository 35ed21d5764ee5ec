use core::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use logger::LogInterface;
use mutex::SpinNoIrqLock;

static LOGOUT: AtomicBool = AtomicBool::new(false);
static LOG_LOCK: SpinNoIrqLock<()> = SpinNoIrqLock::new(());

pub fn print_in_color(args: fmt::Arguments, color_code: u8) {
    print!("\u{1B}[{}m{}\u{1B}[0m", color_code, args);
}

struct LogInterfaceImpl;

#[crate_interface::impl_interface]
impl LogInterface for LogInterfaceImpl {
    fn print_log(record: &log::Record) {
        let _guard = LOG_LOCK.lock();

        if !can_log() {
            return;
        }

        print_in_color(
            format_args!(
                "[{:>5}][{}:{}] {}\n",
                record.level(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            ),
            logger::level2color(record.level()),
        );
    }
}

/// Installs the logger and turns output on.
pub fn init() {
    logger::init();
    enable_log();
}

pub fn can_log() -> bool {
    LOGOUT.load(Ordering::Relaxed)
}

pub fn enable_log() {
    LOGOUT.store(true, Ordering::Relaxed);
    log::debug!("Log Enable");
}

pub fn disable_log() {
    LOGOUT.store(false, Ordering::Relaxed)
}
