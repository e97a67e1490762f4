use std::sync::Mutex;

/// Messages kept while buffering; the rest are only counted.
const MAX_BUFFERED: usize = 200;

struct Buffer {
    messages: Vec<String>,
    dropped: usize,
}

static BUFFER: Mutex<Option<Buffer>> = Mutex::new(None);

/// Warnings collected while buffering was active.
#[derive(Debug, Default, PartialEq)]
pub struct Drained {
    pub messages: Vec<String>,
    /// Messages beyond the retention limit that were discarded.
    pub dropped: usize,
}

/// Activate buffering. While active, `buffered_eprintln!()` calls store
/// messages instead of printing to stderr, so a progress line is not torn.
pub fn activate() {
    if let Ok(mut guard) = BUFFER.lock() {
        *guard = Some(Buffer {
            messages: Vec::new(),
            dropped: 0,
        });
    }
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Drained {
    let taken = BUFFER.lock().ok().and_then(|mut guard| guard.take());
    match taken {
        Some(buf) => Drained {
            messages: buf.messages,
            dropped: buf.dropped,
        },
        None => Drained::default(),
    }
}

/// Print everything buffered so far and stop buffering.
pub fn flush() {
    let drained = drain();
    for msg in &drained.messages {
        eprintln!("{}", msg);
    }
    if drained.dropped > 0 {
        eprintln!("... and {} more warnings", drained.dropped);
    }
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = match BUFFER.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(buf) = guard.as_mut() {
        if buf.messages.len() < MAX_BUFFERED {
            buf.messages.push(msg);
        } else {
            buf.dropped += 1;
        }
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Convenience macro that works like `eprintln!` but routes through the
/// stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}
