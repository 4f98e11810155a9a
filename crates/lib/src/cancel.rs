//! Interrupt relay for in-flight child processes.
//!
//! Every running child registers itself here for as long as it runs. When the
//! user interrupts the orchestrator, [`CancellationRegistry::interrupt_all`]
//! signals every registration and returns immediately; each owning runner then
//! asks its child to stop and reports the resulting exit status as usual. The
//! registry never shuts the orchestrator down itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct RegistryState {
  next_id: u64,
  handles: HashMap<u64, oneshot::Sender<()>>,
  interrupted: bool,
}

/// Set of currently registered processes.
///
/// Registration, deregistration and interrupt delivery all go through one
/// lock, so a process is either signalled by an interrupt or registered after
/// it (and then signalled on registration); it is never missed.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
  state: Mutex<RegistryState>,
}

impl CancellationRegistry {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  fn lock(&self) -> MutexGuard<'_, RegistryState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Register a process. Dropping the returned guard deregisters it.
  pub fn register(self: &Arc<Self>) -> Registration {
    let (tx, rx) = oneshot::channel();
    let mut state = self.lock();
    let id = state.next_id;
    state.next_id += 1;

    if state.interrupted {
      let _ = tx.send(());
    } else {
      state.handles.insert(id, tx);
    }

    Registration {
      registry: Arc::clone(self),
      id,
      signal: rx,
    }
  }

  fn deregister(&self, id: u64) {
    self.lock().handles.remove(&id);
  }

  /// Forward an interrupt to every registered process without waiting for
  /// any of them. Returns the number of processes signalled.
  pub fn interrupt_all(&self) -> usize {
    let mut state = self.lock();
    state.interrupted = true;
    let handles: Vec<_> = state.handles.drain().collect();
    drop(state);

    let count = handles.len();
    for (_, tx) in handles {
      // The receiver is gone if the process finished in the meantime
      let _ = tx.send(());
    }
    count
  }

  /// Whether an interrupt has been delivered.
  pub fn is_interrupted(&self) -> bool {
    self.lock().interrupted
  }

  /// Number of processes waiting for a possible interrupt.
  pub fn len(&self) -> usize {
    self.lock().handles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// A live registration in a [`CancellationRegistry`].
#[derive(Debug)]
pub struct Registration {
  registry: Arc<CancellationRegistry>,
  id: u64,
  signal: oneshot::Receiver<()>,
}

impl Registration {
  /// Resolves once an interrupt is forwarded to this process.
  ///
  /// Never resolves if the registration is removed without an interrupt.
  pub async fn interrupted(&mut self) {
    if (&mut self.signal).await.is_err() {
      std::future::pending::<()>().await;
    }
  }
}

impl Drop for Registration {
  fn drop(&mut self) {
    self.registry.deregister(self.id);
  }
}

/// Relay Ctrl+C to the registry for the rest of the process lifetime.
pub fn spawn_interrupt_listener(registry: Arc<CancellationRegistry>) -> JoinHandle<()> {
  tokio::spawn(async move {
    loop {
      if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for interrupt signal");
        return;
      }
      let count = registry.interrupt_all();
      info!(processes = count, "interrupt received, forwarding to running processes");
    }
  })
}
