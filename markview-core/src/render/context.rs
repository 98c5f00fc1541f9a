//! Per-render state

use super::RenderOptions;
use crate::classify::Classification;
use crate::highlight::CodeHighlighter;
use crate::slug::Slugger;

/// Everything one render pass reads or mutates. Built fresh for each render.
pub struct RenderContext<'a> {
    options: RenderOptions,
    slugger: Slugger,
    classification: &'a Classification,
    highlighter: &'a dyn CodeHighlighter,
    images: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        options: RenderOptions,
        classification: &'a Classification,
        highlighter: &'a dyn CodeHighlighter,
    ) -> Self {
        RenderContext {
            options,
            slugger: Slugger::new(),
            classification,
            highlighter,
            images: 0,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn classification(&self) -> &Classification {
        self.classification
    }

    pub fn highlighter(&self) -> &dyn CodeHighlighter {
        self.highlighter
    }

    /// Next heading id, or `None` when fragments are disabled
    pub fn heading_id(&mut self, heading_text: &str) -> Option<String> {
        if self.options.no_fragments {
            None
        } else {
            Some(self.slugger.slug(heading_text))
        }
    }

    /// Reserve the next image index
    pub fn next_image(&mut self) -> usize {
        let index = self.images;
        self.images += 1;
        index
    }

    pub fn image_count(&self) -> usize {
        self.images
    }
}
