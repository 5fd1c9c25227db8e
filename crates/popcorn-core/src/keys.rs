//! Key-press event source and key-bound listeners.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

type Action = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key code, e.g. `Enter`, `Escape`, `KeyA`
    pub code: String,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

struct Registration {
    id: u64,
    key: String, // lowercased
    action: Action,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Registration>,
}

/// Global keyboard event source. Cloning shares the same listener set.
#[derive(Clone, Default)]
pub struct KeyboardEvents {
    registry: Arc<Mutex<Registry>>,
}

impl KeyboardEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver one key press; returns how many actions ran.
    ///
    /// Actions run after the registry lock is released, so an action may
    /// attach or drop listeners.
    pub fn emit(&self, event: &KeyEvent) -> usize {
        let code = event.code.to_lowercase();
        let matching: Vec<Action> = self
            .lock()
            .listeners
            .iter()
            .filter(|r| r.key == code)
            .map(|r| Arc::clone(&r.action))
            .collect();

        trace!("Key '{}' matched {} listener(s)", event.code, matching.len());
        for action in &matching {
            action();
        }
        matching.len()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn register(&self, key: &str, action: Action) -> u64 {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Registration {
            id,
            key: key.to_lowercase(),
            action,
        });
        id
    }

    fn unregister(&self, id: u64) {
        self.lock().listeners.retain(|r| r.id != id);
    }
}

/// Runs an action on every press of one key while alive.
///
/// Key comparison is case-insensitive. Dropping the listener detaches it.
pub struct KeyListener {
    events: KeyboardEvents,
    id: u64,
}

impl KeyListener {
    pub fn attach<F>(events: &KeyboardEvents, key: &str, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = events.register(key, Arc::new(action));
        Self {
            events: events.clone(),
            id,
        }
    }

    /// Swap key and action. The old registration is removed before the new
    /// one is added, so this listener never has two live registrations.
    pub fn rebind<F>(&mut self, key: &str, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events.unregister(self.id);
        self.id = self.events.register(key, Arc::new(action));
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.events.unregister(self.id);
    }
}
