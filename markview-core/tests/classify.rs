//! Image classifier behaviour under a tokio runtime, with scripted probes.

use async_trait::async_trait;
use markview_core::classify::probe::ImageProbe;
use markview_core::classify::{ImageClassifier, ImageUrlPattern, StaticProbe, UrlState};
use markview_core::render::view::DocumentView;
use markview_core::{ProbeError, RenderOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Probe whose answers are released by the test through oneshot gates
#[derive(Default)]
struct GatedProbe {
    gates: Mutex<HashMap<String, oneshot::Receiver<bool>>>,
}

impl GatedProbe {
    fn gate(&self, url: &str) -> oneshot::Sender<bool> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(url.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ImageProbe for GatedProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        let gate = self.gates.lock().unwrap().remove(url);
        match gate {
            Some(rx) => match rx.await {
                Ok(true) => Ok(()),
                Ok(false) => Err(ProbeError::NotAnImage("text/html".into())),
                Err(_) => Err(ProbeError::Transport("gate dropped".into())),
            },
            None => Err(ProbeError::Transport(format!("no gate for {url}"))),
        }
    }
}

/// Probe that counts calls and always succeeds
#[derive(Default)]
struct CountingProbe {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ImageProbe for CountingProbe {
    async fn probe(&self, _url: &str) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn image_extension_is_loaded_without_probe() {
    let probe = CountingProbe::default();
    let calls = Arc::clone(&probe.calls);
    let mut classifier = ImageClassifier::new(probe);

    let classification = classifier
        .classify(["https://x.test/pic.png", "https://x.test/anim.GIF?x=1"])
        .unwrap();
    classifier.settle().await;

    assert!(classification.is_loaded("https://x.test/pic.png"));
    assert!(classification.is_loaded("https://x.test/anim.GIF?x=1"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn probe_outcomes_become_states() {
    let probe = StaticProbe::new()
        .with("https://x.test/avatar", true)
        .with("https://x.test/page", false);
    let mut classifier = ImageClassifier::new(probe);

    let classification = classifier
        .classify([
            "https://x.test/avatar",
            "https://x.test/page",
            "https://x.test/unreachable",
        ])
        .unwrap();
    assert_eq!(
        classification.get("https://x.test/avatar"),
        Some(UrlState::Loading)
    );

    classifier.settle().await;
    assert_eq!(
        classification.get("https://x.test/avatar"),
        Some(UrlState::Loaded)
    );
    assert_eq!(
        classification.get("https://x.test/page"),
        Some(UrlState::Errored)
    );
    assert_eq!(
        classification.get("https://x.test/unreachable"),
        Some(UrlState::Errored)
    );
    assert_eq!(classifier.in_flight(), 0);
}

#[tokio::test]
async fn stale_probe_cannot_touch_new_state() {
    let probe = Arc::new(GatedProbe::default());
    let old_gate = probe.gate("https://old.test/a");
    let new_gate = probe.gate("https://new.test/b");
    let mut classifier = ImageClassifier::with_shared_probe(probe.clone());

    let old = classifier.classify(["https://old.test/a"]).unwrap();
    tokio::task::yield_now().await;
    let new = classifier.classify(["https://new.test/b"]).unwrap();
    assert!(!old.same_map(&new));
    assert!(new.generation() > old.generation());

    // the superseded probe completes after the text changed
    let _ = old_gate.send(true);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(new.get("https://old.test/a"), None);
    assert_eq!(old.get("https://old.test/a"), Some(UrlState::Loading));
    assert_eq!(new.get("https://new.test/b"), Some(UrlState::Loading));

    new_gate.send(true).unwrap();
    classifier.settle().await;
    assert_eq!(new.get("https://new.test/b"), Some(UrlState::Loaded));
    assert_eq!(new.len(), 1);
}

#[tokio::test]
async fn completions_in_any_order_write_own_keys() {
    let probe = Arc::new(GatedProbe::default());
    let urls = ["https://a.test/1", "https://a.test/2", "https://a.test/3"];
    let gates: Vec<_> = urls.iter().map(|url| probe.gate(url)).collect();
    let mut classifier = ImageClassifier::with_shared_probe(probe.clone());
    let classification = classifier.classify(urls).unwrap();

    let mut gates = gates.into_iter();
    let first = gates.next().unwrap();
    let second = gates.next().unwrap();
    let third = gates.next().unwrap();
    third.send(false).unwrap();
    first.send(true).unwrap();
    drop(second);

    classifier.settle().await;
    let snapshot = classification.snapshot();
    assert_eq!(snapshot["https://a.test/1"], UrlState::Loaded);
    assert_eq!(snapshot["https://a.test/2"], UrlState::Errored);
    assert_eq!(snapshot["https://a.test/3"], UrlState::Errored);
}

#[tokio::test]
async fn revision_bumps_on_completion() {
    let mut classifier = ImageClassifier::new(StaticProbe::new().with("https://x.test/i", true));
    let mut revisions = classifier.subscribe();
    classifier.classify(["https://x.test/i"]).unwrap();
    classifier.settle().await;

    assert!(revisions.has_changed().unwrap());
    assert_eq!(*revisions.borrow_and_update(), 2);
}

#[tokio::test]
async fn custom_extensions() {
    let mut classifier =
        ImageClassifier::new(StaticProbe::new()).with_pattern(ImageUrlPattern::new(&["svg"]));
    let classification = classifier
        .classify(["https://x.test/logo.svg", "https://x.test/pic.png"])
        .unwrap();
    classifier.settle().await;
    assert!(classification.is_loaded("https://x.test/logo.svg"));
    assert_eq!(
        classification.get("https://x.test/pic.png"),
        Some(UrlState::Errored)
    );
}

#[tokio::test]
async fn probed_link_renders_as_image() {
    let probe = StaticProbe::new().with("https://cdn.test/avatar", true);
    let mut view = DocumentView::new(ImageClassifier::new(probe), RenderOptions::default());

    view.set_text("[me](https://cdn.test/avatar) [docs](https://docs.test/)")
        .unwrap();
    let before = view.render();
    assert!(before.images().is_empty());
    assert_eq!(before.links().len(), 2);

    view.settle().await;
    let after = view.render();
    assert_eq!(after.images()[0].src, "https://cdn.test/avatar");
    assert_eq!(after.links().len(), 1);
    assert_eq!(after.links()[0].href, "https://docs.test/");
}

#[tokio::test]
async fn new_text_cancels_previous_probes() {
    let probe = Arc::new(GatedProbe::default());
    let old_gate = probe.gate("https://old.test/x");
    let mut view = DocumentView::new(
        ImageClassifier::with_shared_probe(probe.clone()),
        RenderOptions::default(),
    );

    view.set_text("[x](https://old.test/x)").unwrap();
    let old = view.classification().clone();
    view.set_text("no links here").unwrap();

    let _ = old_gate.send(true);
    view.settle().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(old.get("https://old.test/x"), Some(UrlState::Loading));
    assert!(view.classification().is_empty());
    assert_eq!(view.classifier().in_flight(), 0);
}
