//! Zoomable images
//!
//! Every rendered image starts `Fitted` and flips between `Fitted` and `Expanded` on click.
//! A toggle remembers the source it was created for; pointing it at a different source puts
//! it back to `Fitted`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomState {
    #[default]
    Fitted,
    Expanded,
}

impl ZoomState {
    pub fn toggled(self) -> Self {
        match self {
            ZoomState::Fitted => ZoomState::Expanded,
            ZoomState::Expanded => ZoomState::Fitted,
        }
    }
}

/// Inline style of an image in a given zoom state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<&'static str>,
    pub cursor: &'static str,
}

impl ImageStyle {
    pub fn for_state(state: ZoomState, top_level: bool) -> Self {
        match state {
            ZoomState::Fitted => ImageStyle {
                max_height: Some(if top_level { "75vh" } else { "25vh" }),
                width: None,
                cursor: "zoom-in",
            },
            ZoomState::Expanded => ImageStyle {
                max_height: None,
                width: Some("100%"),
                cursor: "zoom-out",
            },
        }
    }

    /// CSS declaration list, e.g. `max-height: 75vh; cursor: zoom-in`
    pub fn to_css(&self) -> String {
        let mut declarations = Vec::new();
        if let Some(max_height) = self.max_height {
            declarations.push(format!("max-height: {max_height}"));
        }
        if let Some(width) = self.width {
            declarations.push(format!("width: {width}"));
        }
        declarations.push(format!("cursor: {}", self.cursor));
        declarations.join("; ")
    }
}

/// Zoom state of one image slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomToggle {
    src: String,
    state: ZoomState,
}

impl ZoomToggle {
    pub fn new(src: impl Into<String>) -> Self {
        ZoomToggle {
            src: src.into(),
            state: ZoomState::Fitted,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn click(&mut self) -> ZoomState {
        self.state = self.state.toggled();
        self.state
    }

    /// Point the toggle at `src`. A different source resets the state to `Fitted`.
    pub fn set_src(&mut self, src: &str) {
        if self.src != src {
            self.src = src.to_string();
            self.state = ZoomState::Fitted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_cycle() {
        let mut toggle = ZoomToggle::new("a.png");
        assert_eq!(toggle.state(), ZoomState::Fitted);
        assert_eq!(toggle.click(), ZoomState::Expanded);
        assert_eq!(toggle.click(), ZoomState::Fitted);
    }

    #[test]
    fn new_source_resets() {
        let mut toggle = ZoomToggle::new("a.png");
        toggle.click();
        toggle.set_src("a.png");
        assert_eq!(toggle.state(), ZoomState::Expanded);
        toggle.set_src("b.png");
        assert_eq!(toggle.state(), ZoomState::Fitted);
        assert_eq!(toggle.src(), "b.png");
    }

    #[test]
    fn styles() {
        assert_eq!(
            ImageStyle::for_state(ZoomState::Fitted, true).to_css(),
            "max-height: 75vh; cursor: zoom-in"
        );
        assert_eq!(
            ImageStyle::for_state(ZoomState::Fitted, false).to_css(),
            "max-height: 25vh; cursor: zoom-in"
        );
        assert_eq!(
            ImageStyle::for_state(ZoomState::Expanded, false).to_css(),
            "width: 100%; cursor: zoom-out"
        );
    }
}
