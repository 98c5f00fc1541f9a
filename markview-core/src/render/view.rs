//! Stateful document view
//!
//! A [`DocumentView`] is one displayed document: its text, the image classifier probing that
//! text's links, the zoom state of each rendered image and the copied state of each heading
//! anchor. Setting new text supersedes the previous classification (and cancels its
//! probes); rendering always reads the classification of the current text.

use super::anchor::{AnchorCopies, Clipboard, LocationProvider};
use super::zoom::{ZoomState, ZoomToggle};
use super::{render_document, RenderNode, RenderOptions, RenderTree};
use crate::ast::{extract_urls, Node};
use crate::classify::{Classification, ImageClassifier};
use crate::error::ClassifyError;
use crate::highlight::{CodeHighlighter, SyntectHighlighter};
use crate::parser::parse;
use crate::transforms::transform;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use url::Url;

pub struct DocumentView {
    text: Option<String>,
    document: Node,
    options: RenderOptions,
    classifier: ImageClassifier,
    highlighter: Arc<dyn CodeHighlighter>,
    zoom: Vec<ZoomToggle>,
    anchors: AnchorCopies,
}

impl DocumentView {
    pub fn new(classifier: ImageClassifier, options: RenderOptions) -> Self {
        DocumentView {
            text: None,
            document: Node::Root(Vec::new()),
            options,
            classifier,
            highlighter: Arc::new(SyntectHighlighter::default()),
            zoom: Vec::new(),
            anchors: AnchorCopies::new(),
        }
    }

    pub fn with_highlighter(mut self, highlighter: Arc<dyn CodeHighlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn document(&self) -> &Node {
        &self.document
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Display `text`. Returns `Ok(false)` if it is the text already shown.
    ///
    /// On new text the previous classification is superseded: its probes are cancelled and
    /// can no longer write into the state this view renders from. If probes are needed but
    /// there is no runtime, the view keeps showing the previous text.
    pub fn set_text(&mut self, text: &str) -> Result<bool, ClassifyError> {
        if self.text.as_deref() == Some(text) {
            return Ok(false);
        }

        let mut document = parse(text);
        transform(&mut document);
        self.classifier.classify(extract_urls(&document))?;

        self.document = document;
        self.text = Some(text.to_string());
        self.anchors.clear();
        Ok(true)
    }

    pub fn classification(&self) -> &Classification {
        self.classifier.current()
    }

    pub fn classifier(&self) -> &ImageClassifier {
        &self.classifier
    }

    /// Changes whenever the classification of the current text changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.classifier.subscribe()
    }

    /// Wait for every probe of the current text
    pub async fn settle(&mut self) {
        self.classifier.settle().await;
    }

    /// Toggle zoom of the image at `index` (as numbered by the last render)
    pub fn click_image(&mut self, index: usize) -> Option<ZoomState> {
        self.zoom.get_mut(index).map(ZoomToggle::click)
    }

    pub fn zoom_state(&self, index: usize) -> Option<ZoomState> {
        self.zoom.get(index).map(ZoomToggle::state)
    }

    /// Activate the anchor of heading `id`: copy its deep link and show it as copied
    pub fn copy_anchor(
        &mut self,
        id: &str,
        location: &dyn LocationProvider,
        clipboard: &dyn Clipboard,
        now: Instant,
    ) -> Url {
        self.anchors.activate(id, location, clipboard, now)
    }

    pub fn render(&mut self) -> RenderTree {
        self.render_at(Instant::now())
    }

    /// Render the current text with zoom and anchor state as of `now`
    pub fn render_at(&mut self, now: Instant) -> RenderTree {
        let mut tree = render_document(
            &self.document,
            &self.options,
            self.classifier.current(),
            self.highlighter.as_ref(),
        );

        self.anchors.expire(now);
        let mut seen = 0;
        let zoom = &mut self.zoom;
        let anchors = &self.anchors;
        tree.root.visit_mut(&mut |node| match node {
            RenderNode::Image(image) => {
                match zoom.get_mut(image.index) {
                    Some(toggle) => toggle.set_src(&image.src),
                    None => zoom.push(ZoomToggle::new(image.src.clone())),
                }
                if let Some(toggle) = zoom.get(image.index) {
                    image.set_zoom(toggle.state());
                }
                seen = seen.max(image.index + 1);
            }
            RenderNode::Heading(heading) => {
                if let (Some(id), Some(anchor)) = (&heading.id, &mut heading.anchor) {
                    anchor.copied = anchors.is_copied(id, now);
                }
            }
            _ => {}
        });
        self.zoom.truncate(seen);
        tree
    }
}
