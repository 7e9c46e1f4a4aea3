use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SchedulerError};

/// Install SIGINT/SIGTERM handlers that flip a shared flag.
///
/// The handler does nothing but store `true`; the blocking poll loop
/// observes the flag and performs the actual shutdown cooperatively.
pub(crate) fn install_termination_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| SchedulerError::Signal(e.to_string()))?;
    Ok(flag)
}
