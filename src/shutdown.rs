//! Cooperative shutdown signalling
//!
//! A watch channel fans one "stop now" flag out to every in-flight worker.
//! The coordinator checks the handle between units of work and races it
//! against blob batches, so a ctrl-c drains gracefully instead of killing
//! the process mid-write.

use tokio::sync::watch;

/// Sending half: flips the flag once
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half: cheap to clone, one per worker
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    rx: watch::Receiver<bool>,
}

/// Creates a connected trigger/handle pair
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownHandle) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownHandle { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // Receivers may already be gone at process exit
        let _ = self.tx.send(true);
    }
}

impl ShutdownHandle {
    /// True once shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when shutdown is requested (or the trigger is dropped)
    pub async fn triggered(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Spawns a task that trips the trigger on ctrl-c
pub fn listen_for_ctrl_c(trigger: ShutdownTrigger) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight work");
            trigger.trigger();
        }
    });
}
