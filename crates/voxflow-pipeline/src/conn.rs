//! Registry of live backend connections.
//!
//! Fetch workers register a clone of their socket for the duration of the
//! fetch; shutdown force-closes whatever is still registered so blocked
//! reads return immediately instead of waiting out their timeout.

use std::collections::HashMap;
use std::net::{Shutdown, TcpStream};
use std::sync::Mutex;

use tracing::{debug, warn};

/// Live sockets keyed by sentence index.
#[derive(Default)]
pub struct ConnectionRegistry {
    sockets: Mutex<HashMap<usize, TcpStream>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a worker's socket. Returns a guard that deregisters it when
    /// the fetch finishes, however it finishes.
    pub fn register<'a>(&'a self, index: usize, stream: &TcpStream) -> ConnectionGuard<'a> {
        if let Ok(clone) = stream.try_clone() {
            if let Ok(mut sockets) = self.sockets.lock() {
                sockets.insert(index, clone);
            }
        }
        ConnectionGuard {
            registry: self,
            index,
        }
    }

    fn deregister(&self, index: usize) {
        if let Ok(mut sockets) = self.sockets.lock() {
            sockets.remove(&index);
        }
    }

    /// Shut down every still-registered socket in both directions.
    pub fn force_close_all(&self) {
        let Ok(mut sockets) = self.sockets.lock() else {
            return;
        };
        for (index, socket) in sockets.drain() {
            match socket.shutdown(Shutdown::Both) {
                Ok(()) => debug!(sentence = index, "force-closed backend connection"),
                Err(err) => {
                    warn!(sentence = index, error = %err, "failed to close backend connection");
                }
            }
        }
    }

    /// Number of currently registered connections.
    #[must_use]
    pub fn active(&self) -> usize {
        self.sockets.lock().map_or(0, |sockets| sockets.len())
    }
}

/// Deregisters one connection on drop.
pub struct ConnectionGuard<'a> {
    registry: &'a ConnectionRegistry,
    index: usize,
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.registry.deregister(self.index);
    }
}
