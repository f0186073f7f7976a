//! Process-wide event loop
//!
//! Blocking authentication runs on a single current-thread runtime shared by
//! every [`Context`](crate::Context) in the process. [`init`] must run once
//! before the first blocking call and [`deinit`] tears it down.

use crate::error::{ClientError, ClientResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static EVENT_LOOP: Mutex<Option<Arc<Runtime>>> = Mutex::new(None);

/// Start the process event loop
///
/// Returns [`ClientError::AlreadyInitialized`] if it is already running.
pub fn init() -> ClientResult<()> {
    // The flag and the slot change together under the slot lock
    let mut slot = EVENT_LOOP.lock().unwrap_or_else(PoisonError::into_inner);
    if INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err(ClientError::AlreadyInitialized);
    }

    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            INITIALIZED.store(false, Ordering::Release);
            return Err(ClientError::EventLoopInit(e));
        }
    };

    *slot = Some(Arc::new(runtime));
    drop(slot);
    info!("RADIUS client event loop initialized");
    Ok(())
}

/// Stop the process event loop; no-op when it is not running
pub fn deinit() {
    let runtime = {
        let mut slot = EVENT_LOOP.lock().unwrap_or_else(PoisonError::into_inner);
        if !INITIALIZED.load(Ordering::Acquire) {
            return;
        }
        INITIALIZED.store(false, Ordering::Release);
        slot.take()
    };

    // A caller still inside `block_on` holds another reference; the last one
    // to let go drops the runtime.
    if let Some(runtime) = runtime.and_then(|rt| Arc::try_unwrap(rt).ok()) {
        runtime.shutdown_background();
    }
    info!("RADIUS client event loop deinitialized");
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Shared reference to the running loop
pub(crate) fn handle() -> ClientResult<Arc<Runtime>> {
    let slot = EVENT_LOOP.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some(runtime) => Ok(Arc::clone(runtime)),
        None => {
            debug!("Blocking authentication requested without an event loop");
            Err(ClientError::NotInitialized)
        }
    }
}
