//! Inline style declarations
//!
//! Only text color ever sets `color`. Background and underline styles leave
//! it alone, so however the substrate nests the wrappers, the text color
//! decoration decides the foreground.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Class names hosts can target from a stylesheet
pub const TEXT_CLASS: &str = "colorize-text";
pub const BG_CLASS: &str = "colorize-bg";
pub const UNDERLINE_CLASS: &str = "colorize-underline";

/// The active value of each channel over one segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSet {
    pub color: Option<String>,
    pub background: Option<String>,
    pub underline: bool,
}

impl StyleSet {
    pub fn text(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn background(color: impl Into<String>) -> Self {
        Self {
            background: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn underline() -> Self {
        Self {
            underline: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.background.is_none() && !self.underline
    }

    /// CSS declarations for a `style` attribute
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if let Some(color) = &self.color {
            let _ = write!(css, "color: {};", color);
        }
        if let Some(background) = &self.background {
            push_separator(&mut css);
            let _ = write!(css, "background-color: {};", background);
        }
        if self.underline {
            push_separator(&mut css);
            css.push_str("text-decoration: underline;");
        }
        css
    }

    /// Space-separated class list matching the active channels
    pub fn class_names(&self) -> String {
        let mut classes = Vec::with_capacity(3);
        if self.color.is_some() {
            classes.push(TEXT_CLASS);
        }
        if self.background.is_some() {
            classes.push(BG_CLASS);
        }
        if self.underline {
            classes.push(UNDERLINE_CLASS);
        }
        classes.join(" ")
    }
}

fn push_separator(css: &mut String) {
    if !css.is_empty() {
        css.push(' ');
    }
}
