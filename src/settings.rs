//! # Print Settings
//!
//! Effective print settings and the merge logic that produces them.
//!
//! Callers hand over a sparse [`PrintSettingsOverrides`]; every field they
//! leave out keeps its documented default. The resolved [`PrintSettings`]
//! also knows how to render itself as the order-sensitive argument string
//! the spooling backend expects.

use serde::{Deserialize, Serialize};

/// Effective print settings, every field populated.
///
/// Values are passed through to the backend verbatim; no validation is
/// performed beyond presence-checking during [`PrintSettings::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Paper size, e.g. "A4" or "Letter".
    pub paper: String,
    /// Duplexing method: "simplex", "duplex", ...
    pub method: String,
    /// Page scaling: "fit", "noscale", "shrink".
    pub scale: String,
    /// Page orientation: "portrait" or "landscape".
    pub orientation: String,
    /// Number of copies, >= 1.
    pub repeat: u32,
    /// "color" or "monochrome".
    pub color_type: String,
    /// Optional page range, e.g. "1,3". No default; omitted unless supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            paper: "A4".into(),
            method: "simplex".into(),
            scale: "fit".into(),
            orientation: "portrait".into(),
            repeat: 1,
            color_type: "color".into(),
            range: None,
        }
    }
}

/// Caller-supplied overrides. Every field is optional; absent fields keep
/// their default during [`PrintSettings::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSettingsOverrides {
    #[serde(default)]
    pub paper: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub scale: Option<String>,
    #[serde(default)]
    pub orientation: Option<String>,
    #[serde(default)]
    pub repeat: Option<u32>,
    #[serde(default)]
    pub color_type: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
}

impl PrintSettings {
    /// Merge caller overrides over the defaults, field by field.
    ///
    /// A field is taken from `overrides` only when it is explicitly present;
    /// the default object is never wholesale-replaced. Pure function.
    pub fn resolve(overrides: &PrintSettingsOverrides) -> Self {
        let mut settings = Self::default();
        if let Some(paper) = &overrides.paper {
            settings.paper = paper.clone();
        }
        if let Some(method) = &overrides.method {
            settings.method = method.clone();
        }
        if let Some(scale) = &overrides.scale {
            settings.scale = scale.clone();
        }
        if let Some(orientation) = &overrides.orientation {
            settings.orientation = orientation.clone();
        }
        if let Some(repeat) = overrides.repeat {
            settings.repeat = repeat;
        }
        if let Some(color_type) = &overrides.color_type {
            settings.color_type = color_type.clone();
        }
        if let Some(range) = &overrides.range {
            settings.range = Some(range.clone());
        }
        settings
    }

    /// Render the backend argument string.
    ///
    /// The format is fixed and order-sensitive:
    /// `-print-settings {paper},{method},{scale},{color_type},{repeat}x`.
    /// `orientation` and `range` are carried on the struct but not emitted.
    pub fn spool_arguments(&self) -> String {
        format!(
            "-print-settings {},{},{},{},{}x",
            self.paper, self.method, self.scale, self.color_type, self.repeat
        )
    }
}
