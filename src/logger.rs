use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::Mutex;

static SILENT: AtomicBool = AtomicBool::new(false);

#[cfg(test)]
static LOG_SINK: Mutex<Option<std::fs::File>> = Mutex::new(None);

/// Silence progress output for the rest of the process. Errors bypass the
/// logger and always reach stderr.
pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

/// Redirect log output to a file so tests can assert on it.
#[cfg(test)]
pub fn set_sink(file: Option<std::fs::File>) {
    if let Ok(mut sink) = LOG_SINK.lock() {
        *sink = file;
    }
}

pub fn log_msg(msg: &str) {
    if SILENT.load(Ordering::Relaxed) {
        return;
    }
    #[cfg(test)]
    if let Ok(mut sink) = LOG_SINK.lock() {
        if let Some(file) = sink.as_mut() {
            use std::io::Write;
            let _ = writeln!(file, "{}", msg);
            return;
        }
    }
    eprintln!("{}", msg);
}

#[macro_export]
macro_rules! logger {
    ($($arg:tt)*) => {
        $crate::logger::log_msg(&format!($($arg)*))
    };
}
