//! Heading anchor copy
//!
//! Activating a heading anchor writes a deep link (current location with the heading id as
//! fragment) to the clipboard and shows the anchor as "copied" for [`COPIED_FOR`]. Time is
//! passed in explicitly so renders stay deterministic.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use url::Url;

/// How long an anchor shows the copied state
pub const COPIED_FOR: Duration = Duration::from_millis(1500);

/// Clipboard-write capability
pub trait Clipboard {
    fn write(&self, text: &str);
}

/// Current-location accessor
pub trait LocationProvider {
    fn location(&self) -> Url;
}

impl LocationProvider for Url {
    fn location(&self) -> Url {
        self.clone()
    }
}

/// In-memory clipboard that keeps every write
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.writes.lock().ok()?.last().cloned()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&self, text: &str) {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(text.to_string());
        }
    }
}

/// `location` with its fragment replaced by `id`
pub fn deep_link(location: &Url, id: &str) -> Url {
    let mut link = location.clone();
    link.set_fragment(Some(id));
    link
}

/// Copied state of every anchor in one document view
#[derive(Debug, Clone, Default)]
pub struct AnchorCopies {
    copied_until: HashMap<String, Instant>,
}

impl AnchorCopies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the deep link for `id` and start its copied period at `now`
    pub fn activate(
        &mut self,
        id: &str,
        location: &dyn LocationProvider,
        clipboard: &dyn Clipboard,
        now: Instant,
    ) -> Url {
        let link = deep_link(&location.location(), id);
        clipboard.write(link.as_str());
        self.copied_until.insert(id.to_string(), now + COPIED_FOR);
        tracing::debug!(id, link = %link, "anchor copied");
        link
    }

    pub fn is_copied(&self, id: &str, now: Instant) -> bool {
        self.copied_until
            .get(id)
            .is_some_and(|until| now < *until)
    }

    /// Drop entries whose copied period is over
    pub fn expire(&mut self, now: Instant) {
        self.copied_until.retain(|_, until| now < *until);
    }

    pub fn clear(&mut self) {
        self.copied_until.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Url {
        Url::parse("https://site.test/items/42?sort=new#old").unwrap()
    }

    #[test]
    fn deep_link_replaces_fragment() {
        assert_eq!(
            deep_link(&location(), "intro").as_str(),
            "https://site.test/items/42?sort=new#intro"
        );
    }

    #[test]
    fn copied_state_expires() {
        let clipboard = MemoryClipboard::new();
        let mut copies = AnchorCopies::new();
        let start = Instant::now();

        copies.activate("intro", &location(), &clipboard, start);
        assert_eq!(
            clipboard.last().as_deref(),
            Some("https://site.test/items/42?sort=new#intro")
        );
        assert!(copies.is_copied("intro", start));
        assert!(copies.is_copied("intro", start + Duration::from_millis(1499)));
        assert!(!copies.is_copied("intro", start + COPIED_FOR));
        assert!(!copies.is_copied("other", start));

        copies.expire(start + Duration::from_secs(2));
        assert!(!copies.is_copied("intro", start));
    }

    #[test]
    fn reactivation_extends() {
        let clipboard = MemoryClipboard::new();
        let mut copies = AnchorCopies::new();
        let start = Instant::now();
        copies.activate("a", &location(), &clipboard, start);
        copies.activate("a", &location(), &clipboard, start + Duration::from_secs(1));
        assert!(copies.is_copied("a", start + Duration::from_secs(2)));
        assert_eq!(clipboard.writes().len(), 2);
    }
}
