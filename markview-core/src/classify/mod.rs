//! Image classification of link targets
//!
//!     Every link in a document might point at an image. URLs that look like one (by file
//!     extension) are taken as loaded right away. Everything else starts out `Loading` and is
//!     probed in the background; the probe's outcome moves it to `Loaded` or `Errored`.
//!
//!     State lives in a [`Classification`]: one map per document text. Each call to
//!     [`ImageClassifier::classify`] cancels the probes of the previous call and starts a fresh
//!     map, so a slow probe for text that is no longer displayed can only ever write into a map
//!     nobody reads anymore. Each probe writes only its own key.
//!
//!     Probes run as tokio tasks. Rendering never waits for them: callers read whatever state
//!     the current map holds and re-render when [`ImageClassifier::subscribe`] signals a
//!     change.

pub mod probe;

use crate::error::ClassifyError;
use dashmap::DashMap;
use probe::ImageProbe;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use probe::StaticProbe;
#[cfg(feature = "http-probe")]
pub use probe::HttpImageProbe;

/// Extensions recognized as images when none are configured
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Load state of one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlState {
    Loading,
    Loaded,
    Errored,
}

/// URL → state map for one document text
///
/// Clones share the same map.
#[derive(Debug, Clone)]
pub struct Classification {
    generation: u64,
    states: Arc<DashMap<String, UrlState>>,
}

impl Classification {
    pub fn new(generation: u64) -> Self {
        Classification {
            generation,
            states: Arc::new(DashMap::new()),
        }
    }

    /// Synchronous classification without probes: URLs matching `pattern` are loaded,
    /// everything else stays loading.
    pub fn seeded<I, S>(urls: I, pattern: &ImageUrlPattern) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classification = Classification::new(0);
        for url in urls {
            let url = url.as_ref();
            let state = if pattern.is_match(url) {
                UrlState::Loaded
            } else {
                UrlState::Loading
            };
            classification.set(url, state);
        }
        classification
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, url: &str) -> Option<UrlState> {
        self.states.get(url).map(|entry| *entry.value())
    }

    /// Whether `url` is known to load as an image
    pub fn is_loaded(&self, url: &str) -> bool {
        self.get(url) == Some(UrlState::Loaded)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Ordered copy of the current states
    pub fn snapshot(&self) -> BTreeMap<String, UrlState> {
        self.states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// True if both values share one underlying map
    pub fn same_map(&self, other: &Classification) -> bool {
        Arc::ptr_eq(&self.states, &other.states)
    }

    pub(crate) fn set(&self, url: &str, state: UrlState) {
        self.states.insert(url.to_string(), state);
    }
}

impl Default for Classification {
    fn default() -> Self {
        Classification::new(0)
    }
}

/// Lexical image recognizer: `http(s)://….<ext>` with an optional query or fragment
#[derive(Debug, Clone)]
pub struct ImageUrlPattern {
    regex: Regex,
}

impl ImageUrlPattern {
    /// Pattern accepting the given file extensions (case-insensitive)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| regex::escape(ext.as_ref().trim_start_matches('.')))
            .filter(|ext| !ext.is_empty())
            .collect();
        let source = if alternatives.is_empty() {
            // matches nothing
            r"[^\s\S]".to_string()
        } else {
            format!(
                r"(?i)^https?://\S+\.(?:{})(?:[?#]\S*)?$",
                alternatives.join("|")
            )
        };
        // Every piece is escaped, so the pattern always compiles
        let regex = Regex::new(&source).unwrap_or_else(|_| Regex::new(r"[^\s\S]").unwrap());
        ImageUrlPattern { regex }
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

impl Default for ImageUrlPattern {
    fn default() -> Self {
        ImageUrlPattern::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

/// One in-flight probe. Dropping the handle cancels the probe.
pub struct ProbeHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ProbeHandle {
    /// Detach the probe: it will not write its outcome anywhere
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Drives probes for one document view
pub struct ImageClassifier {
    probe: Arc<dyn ImageProbe>,
    pattern: ImageUrlPattern,
    current: Classification,
    handles: Vec<ProbeHandle>,
    generation: u64,
    revision: Arc<watch::Sender<u64>>,
}

impl ImageClassifier {
    pub fn new<P: ImageProbe>(probe: P) -> Self {
        Self::with_shared_probe(Arc::new(probe))
    }

    pub fn with_shared_probe(probe: Arc<dyn ImageProbe>) -> Self {
        let (revision, _) = watch::channel(0);
        ImageClassifier {
            probe,
            pattern: ImageUrlPattern::default(),
            current: Classification::default(),
            handles: Vec::new(),
            generation: 0,
            revision: Arc::new(revision),
        }
    }

    pub fn with_pattern(mut self, pattern: ImageUrlPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn pattern(&self) -> &ImageUrlPattern {
        &self.pattern
    }

    /// State for the most recent `classify` call
    pub fn current(&self) -> &Classification {
        &self.current
    }

    /// Receiver bumped every time a probe lands in the current classification
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Probes that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Start classifying `urls`, superseding any previous call.
    ///
    /// Needs a tokio runtime only when at least one URL has to be probed. Without one,
    /// nothing changes and [`ClassifyError::NoRuntime`] is returned.
    pub fn classify<I, S>(&mut self, urls: I) -> Result<Classification, ClassifyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (images, unknown): (Vec<String>, Vec<String>) = urls
            .into_iter()
            .map(|url| url.as_ref().to_string())
            .partition(|url| self.pattern.is_match(url));

        let runtime = if unknown.is_empty() {
            None
        } else {
            Some(Handle::try_current().map_err(|_| ClassifyError::NoRuntime)?)
        };

        self.cancel_all();
        self.generation += 1;
        let classification = Classification::new(self.generation);
        debug!(
            generation = self.generation,
            images = images.len(),
            probes = unknown.len(),
            "classifying document urls"
        );

        for url in &images {
            classification.set(url, UrlState::Loaded);
        }
        if let Some(runtime) = runtime {
            for url in unknown {
                classification.set(&url, UrlState::Loading);
                let handle = self.spawn_probe(&runtime, url, classification.clone());
                self.handles.push(handle);
            }
        }

        self.current = classification.clone();
        self.revision.send_modify(|revision| *revision += 1);
        Ok(classification)
    }

    fn spawn_probe(
        &self,
        runtime: &Handle,
        url: String,
        classification: Classification,
    ) -> ProbeHandle {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let probe = Arc::clone(&self.probe);
        let revision = Arc::clone(&self.revision);

        let task = runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    debug!(url = %url, "probe detached");
                }
                result = probe.probe(&url) => {
                    if task_token.is_cancelled() {
                        return;
                    }
                    let state = match result {
                        Ok(()) => UrlState::Loaded,
                        Err(err) => {
                            debug!(url = %url, error = %err, "probe failed");
                            UrlState::Errored
                        }
                    };
                    debug!(url = %url, ?state, "probe finished");
                    classification.set(&url, state);
                    revision.send_modify(|revision| *revision += 1);
                }
            }
        });

        ProbeHandle {
            token,
            task: Some(task),
        }
    }

    /// Cancel every in-flight probe
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
    }

    /// Wait until every probe of the current classification has finished
    pub async fn settle(&mut self) {
        for handle in self.handles.iter_mut() {
            handle.join().await;
        }
    }
}

impl Drop for ImageClassifier {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_matches_image_extensions() {
        let pattern = ImageUrlPattern::default();
        assert!(pattern.is_match("https://x.test/pic.png"));
        assert!(pattern.is_match("http://x.test/a/b.JPG"));
        assert!(pattern.is_match("https://x.test/pic.webp?size=2"));
        assert!(!pattern.is_match("https://x.test/page.html"));
        assert!(!pattern.is_match("https://x.test/png"));
        assert!(!pattern.is_match("ftp://x.test/pic.png"));
    }

    #[test]
    fn custom_extensions() {
        let pattern = ImageUrlPattern::new(&[".svg"]);
        assert!(pattern.is_match("https://x.test/logo.svg"));
        assert!(!pattern.is_match("https://x.test/pic.png"));
        assert!(!ImageUrlPattern::new::<&str>(&[]).is_match("https://x.test/a.png"));
    }

    #[test]
    fn seeded_classification() {
        let classification = Classification::seeded(
            ["https://x.test/a.gif", "https://x.test/page"],
            &ImageUrlPattern::default(),
        );
        assert_eq!(
            classification.get("https://x.test/a.gif"),
            Some(UrlState::Loaded)
        );
        assert_eq!(
            classification.get("https://x.test/page"),
            Some(UrlState::Loading)
        );
        assert_eq!(classification.get("https://x.test/other"), None);
    }

    #[test]
    fn clones_share_state() {
        let a = Classification::new(1);
        let b = a.clone();
        b.set("u", UrlState::Errored);
        assert_eq!(a.get("u"), Some(UrlState::Errored));
        assert!(a.same_map(&b));
        assert!(!a.same_map(&Classification::new(1)));
    }

    #[test]
    fn classify_without_runtime() {
        let mut classifier = ImageClassifier::new(StaticProbe::new());
        // images only: no probe, no runtime needed
        let classification = classifier.classify(["https://x.test/a.png"]).unwrap();
        assert!(classification.is_loaded("https://x.test/a.png"));

        let err = classifier.classify(["https://x.test/page"]).unwrap_err();
        assert_eq!(err, ClassifyError::NoRuntime);
        assert!(classifier.current().same_map(&classification));
    }
}
