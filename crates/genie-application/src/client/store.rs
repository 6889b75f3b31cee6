use super::state::ClientState;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one browser session's state.
pub type ClientHandle = Arc<Mutex<ClientState>>;

/// Idle time after which a browser session's state is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct ClientEntry {
    handle: ClientHandle,
    /// Milliseconds since the store's epoch at the last request
    last_seen_ms: AtomicU64,
}

/// In-memory registry of browser sessions keyed by cookie id.
///
/// Nothing is persisted. Entries not touched for `idle_timeout` are removed
/// by [`evict_idle`](Self::evict_idle).
#[derive(Clone)]
pub struct ClientStore {
    clients: Arc<RwLock<HashMap<String, ClientEntry>>>,
    epoch: Instant,
    idle_timeout: Duration,
}

impl Default for ClientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStore {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            epoch: Instant::now(),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Gets the state for `client_id`, creating it on first use.
    pub async fn get_or_create(&self, client_id: &str) -> ClientHandle {
        let now = self.now_ms();
        {
            let clients = self.clients.read().await;
            if let Some(entry) = clients.get(client_id) {
                entry.last_seen_ms.store(now, Ordering::Relaxed);
                return entry.handle.clone();
            }
        }

        let mut clients = self.clients.write().await;
        let entry = clients.entry(client_id.to_string()).or_insert_with(|| {
            tracing::debug!("Created client state for {}", client_id);
            ClientEntry {
                handle: Arc::new(Mutex::new(ClientState::new())),
                last_seen_ms: AtomicU64::new(now),
            }
        });
        entry.last_seen_ms.store(now, Ordering::Relaxed);
        entry.handle.clone()
    }

    pub async fn get(&self, client_id: &str) -> Option<ClientHandle> {
        self.clients
            .read()
            .await
            .get(client_id)
            .map(|entry| entry.handle.clone())
    }

    pub async fn remove(&self, client_id: &str) {
        self.clients.write().await.remove(client_id);
    }

    /// Drops every client idle for at least `idle_timeout`. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = self.now_ms();
        let timeout_ms = u64::try_from(self.idle_timeout.as_millis()).unwrap_or(u64::MAX);

        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|_, entry| {
            now.saturating_sub(entry.last_seen_ms.load(Ordering::Relaxed)) < timeout_ms
        });
        before - clients.len()
    }

    /// Runs [`evict_idle`](Self::evict_idle) every `every` on the runtime.
    pub fn start_eviction_scheduler(&self, every: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            tracing::info!(
                "[ClientStore] Eviction started ({}s idle timeout)",
                store.idle_timeout.as_secs()
            );
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!("[ClientStore] Evicted {} idle client(s)", evicted);
                }
            }
        });
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
