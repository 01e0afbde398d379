//! Cooperative cancellation handed to fetchers alongside each request.

use std::sync::Arc;

use tokio::sync::watch;

/// Owning side of an abort pair. Kept by the controller for the in-flight request.
#[derive(Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

/// Observing side of an abort pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
    _keep_alive: Option<Arc<watch::Sender<bool>>>,
}

pub fn abort_pair() -> (AbortHandle, AbortSignal) {
    let (tx, rx) = watch::channel(false);
    (
        AbortHandle { tx },
        AbortSignal {
            rx,
            _keep_alive: None,
        },
    )
}

impl AbortHandle {
    pub fn abort(&self) {
        self.tx.send_if_modified(|aborted| {
            if *aborted {
                false
            } else {
                *aborted = true;
                true
            }
        });
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
            _keep_alive: None,
        }
    }
}

impl AbortSignal {
    /// A signal that owns its own sender, so it never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _keep_alive: Some(Arc::new(tx)),
        }
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the request is aborted or its handle is dropped.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
