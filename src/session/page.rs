use crate::session::{affordance::Affordance, provider::ProviderFactory};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use url::Url;

/// Browser location: where the page is and how to leave it.
pub trait Navigator: Send + Sync {
    fn location(&self) -> Url;

    /// Equivalent of assigning `window.location.href`; relative targets resolve
    /// against the current location.
    fn navigate(&self, href: &str);
}

/// Durable, origin-scoped string store (`localStorage` in a browser).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);
}

/// Process-local store for hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

/// What the hosting page offers the guard. `None` means the page does not have it.
pub struct PageEnvironment {
    /// The identity provider's client library, if the page loaded it.
    pub provider: Option<Arc<dyn ProviderFactory>>,
    pub login_link: Option<Arc<dyn Affordance>>,
    pub logout_link: Option<Arc<dyn Affordance>>,
    pub navigator: Arc<dyn Navigator>,
    pub storage: Arc<dyn KeyValueStore>,
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryStore};

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryStore::new();
        assert_eq!(store.get("auth_next"), None);

        store.set("auth_next", "/a.html");
        store.set("auth_next", "/b.html");

        assert_eq!(store.get("auth_next").as_deref(), Some("/b.html"));
    }
}
