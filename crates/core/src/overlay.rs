//! Overlay entity, create payload, partial patches and validation.
//!
//! An overlay is a positioned text or image annotation drawn above the
//! player surface. Geometry is stored in integer pixels relative to the
//! surface origin; see [`crate::geometry`] for the bounds.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::{clamp_size, MIN_HEIGHT, MIN_WIDTH};
use crate::types::OverlayId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of an overlay's display name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a text overlay's content.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Maximum length of an image overlay's URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Placeholder image used by the "sample logo" preset.
pub const SAMPLE_LOGO_URL: &str = "https://via.placeholder.com/150";

// ---------------------------------------------------------------------------
// Overlay kind
// ---------------------------------------------------------------------------

/// What an overlay renders: literal text or an image loaded from a URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    #[default]
    Text,
    Image,
}

/// All valid overlay kind strings.
const VALID_KIND_STRINGS: &[&str] = &["text", "image"];

impl OverlayKind {
    /// Return the kind as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    /// Parse a kind from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(CoreError::Validation(format!(
                "Invalid overlay type '{s}'. Must be one of: {}",
                VALID_KIND_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// A persisted overlay as known to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub visible: bool,
}

impl Overlay {
    /// Overwrite exactly the fields present in `patch`.
    pub fn apply_patch(&mut self, patch: &OverlayPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
    }

    /// Return a copy with `width`/`height` raised to the minimum bounds.
    ///
    /// The store never receives undersized dimensions from a gesture, but a
    /// direct write to the remote store can, so loaded overlays go through
    /// this before they reach the collection.
    pub fn clamped(mut self) -> Self {
        let (width, height) = clamp_size(self.width, self.height);
        if width != self.width || height != self.height {
            tracing::debug!(
                overlay_id = %self.id,
                stored_width = self.width,
                stored_height = self.height,
                "Clamping undersized overlay",
            );
        }
        self.width = width;
        self.height = height;
        self
    }

    /// `true` when the overlay satisfies the minimum interactive bounds.
    pub fn has_valid_size(&self) -> bool {
        self.width >= MIN_WIDTH && self.height >= MIN_HEIGHT
    }

    /// Validate name and content for the overlay's kind.
    ///
    /// Patches are checked by applying them to a copy of the stored overlay
    /// and validating the result, so a content-only patch on an image
    /// overlay is held to the URL rules.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_content(self.kind, &self.content)
    }
}

// ---------------------------------------------------------------------------
// NewOverlay
// ---------------------------------------------------------------------------

/// An overlay that has not been persisted yet (no id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOverlay {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: OverlayKind,
    pub content: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Default for NewOverlay {
    /// Matches the blank create form.
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: OverlayKind::Text,
            content: String::new(),
            x: 20,
            y: 20,
            width: 200,
            height: 60,
            visible: true,
        }
    }
}

impl NewOverlay {
    /// "Add Timestamp" preset: a text overlay holding the given local time.
    pub fn timestamp_at(now: chrono::DateTime<chrono::Local>) -> Self {
        Self {
            name: "Timestamp".to_string(),
            kind: OverlayKind::Text,
            content: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            x: 10,
            y: 10,
            width: 220,
            height: 40,
            visible: true,
        }
    }

    /// "Add Timestamp" preset stamped with the current local time.
    pub fn timestamp() -> Self {
        Self::timestamp_at(chrono::Local::now())
    }

    /// "Add Sample Logo" preset.
    pub fn sample_logo() -> Self {
        Self {
            name: "Logo".to_string(),
            kind: OverlayKind::Image,
            content: SAMPLE_LOGO_URL.to_string(),
            x: 600,
            y: 10,
            width: 120,
            height: 60,
            visible: true,
        }
    }

    /// Return a copy with `width`/`height` raised to the minimum bounds.
    pub fn clamped(mut self) -> Self {
        (self.width, self.height) = clamp_size(self.width, self.height);
        self
    }

    /// Attach a store-assigned id.
    pub fn into_overlay(self, id: OverlayId) -> Overlay {
        Overlay {
            id,
            name: self.name,
            kind: self.kind,
            content: self.content,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            visible: self.visible,
        }
    }

    /// Validate name and content for the declared kind.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_content(self.kind, &self.content)
    }
}

// ---------------------------------------------------------------------------
// OverlayPatch
// ---------------------------------------------------------------------------

/// A partial-field update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OverlayKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl OverlayPatch {
    /// Patch that moves an overlay.
    pub fn position(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets position and size together (resize commit).
    pub fn geometry(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Patch that only flips visibility.
    pub fn visibility(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    /// Full-field patch built from a form submission for an existing overlay.
    pub fn from_form(form: &NewOverlay) -> Self {
        Self {
            name: Some(form.name.clone()),
            kind: Some(form.kind),
            content: Some(form.content.clone()),
            x: Some(form.x),
            y: Some(form.y),
            width: Some(form.width),
            height: Some(form.height),
            visible: Some(form.visible),
        }
    }

    /// Return a copy whose `width`/`height`, when present, respect the
    /// minimum bounds.
    pub fn clamped(mut self) -> Self {
        self.width = self.width.map(|w| w.max(MIN_WIDTH));
        self.height = self.height.map(|h| h.max(MIN_HEIGHT));
        self
    }

    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate an overlay display name.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate overlay content for the given kind.
///
/// Text content only has a length limit. Image content must be a non-empty
/// URL without whitespace: absolute `http(s)://`, protocol-relative, or a
/// path on the serving host.
pub fn validate_content(kind: OverlayKind, content: &str) -> Result<(), CoreError> {
    match kind {
        OverlayKind::Text => {
            let len = content.chars().count();
            if len > MAX_TEXT_LENGTH {
                return Err(CoreError::Validation(format!(
                    "text content must be at most {MAX_TEXT_LENGTH} characters, got {len}"
                )));
            }
            Ok(())
        }
        OverlayKind::Image => validate_image_url(content),
    }
}

fn validate_image_url(url: &str) -> Result<(), CoreError> {
    if url.is_empty() {
        return Err(CoreError::Validation(
            "image content must be a URL".to_string(),
        ));
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(CoreError::Validation(format!(
            "image URL must be at most {MAX_URL_LENGTH} bytes"
        )));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!(
            "Invalid image URL '{url}'. Must not contain whitespace"
        )));
    }
    let lower = url.to_ascii_lowercase();
    let accepted = lower.starts_with("http://")
        || lower.starts_with("https://")
        || url.starts_with('/');
    if !accepted {
        return Err(CoreError::Validation(format!(
            "Invalid image URL '{url}'. Must start with http://, https:// or /"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Overlay {
        NewOverlay::sample_logo().into_overlay(OverlayId::new("abc"))
    }

    // -- OverlayKind -------------------------------------------------------

    #[test]
    fn kind_round_trip() {
        assert_eq!(OverlayKind::from_str("text").unwrap(), OverlayKind::Text);
        assert_eq!(OverlayKind::from_str("image").unwrap(), OverlayKind::Image);
        assert_eq!(OverlayKind::Image.as_str(), "image");
    }

    #[test]
    fn kind_invalid_rejected() {
        let err = OverlayKind::from_str("video").unwrap_err();
        assert!(err.to_string().contains("Invalid overlay type"));
    }

    // -- serde -------------------------------------------------------------

    #[test]
    fn overlay_serializes_kind_as_type() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["id"], "abc");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn new_overlay_defaults_type_and_visible() {
        let input: NewOverlay = serde_json::from_value(json!({
            "name": "n", "content": "c", "x": 1, "y": 2, "width": 60, "height": 30
        }))
        .unwrap();
        assert_eq!(input.kind, OverlayKind::Text);
        assert!(input.visible);
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let value = serde_json::to_value(OverlayPatch::visibility(false)).unwrap();
        assert_eq!(value, json!({"visible": false}));
    }

    // -- apply_patch / clamped ---------------------------------------------

    #[test]
    fn apply_patch_touches_only_present_fields() {
        let mut overlay = sample();
        overlay.apply_patch(&OverlayPatch::position(36, 17));
        assert_eq!((overlay.x, overlay.y), (36, 17));
        assert_eq!((overlay.width, overlay.height), (120, 60));
        assert_eq!(overlay.name, "Logo");
        assert!(overlay.visible);
    }

    #[test]
    fn apply_form_patch_replaces_all_fields() {
        let mut overlay = sample();
        let form = NewOverlay {
            name: "Banner".into(),
            content: "Live".into(),
            visible: false,
            ..NewOverlay::default()
        };
        overlay.apply_patch(&OverlayPatch::from_form(&form));
        assert_eq!(overlay.id.as_str(), "abc");
        assert_eq!(overlay.kind, OverlayKind::Text);
        assert_eq!((overlay.x, overlay.y, overlay.width, overlay.height), (20, 20, 200, 60));
        assert!(!overlay.visible);
    }

    #[test]
    fn clamped_raises_undersized_geometry() {
        let mut overlay = sample();
        overlay.width = 3;
        overlay.height = 4;
        assert!(!overlay.has_valid_size());
        let overlay = overlay.clamped();
        assert_eq!((overlay.width, overlay.height), (50, 20));
        assert!(overlay.has_valid_size());
    }

    #[test]
    fn patch_clamp_only_touches_present_dimensions() {
        let patch = OverlayPatch {
            width: Some(10),
            ..OverlayPatch::default()
        }
        .clamped();
        assert_eq!(patch.width, Some(50));
        assert_eq!(patch.height, None);

        let form = NewOverlay {
            width: 0,
            height: 0,
            ..NewOverlay::default()
        }
        .clamped();
        assert_eq!((form.width, form.height), (50, 20));
    }

    #[test]
    fn empty_patch_detected() {
        assert!(OverlayPatch::default().is_empty());
        assert!(!OverlayPatch::visibility(true).is_empty());
    }

    // -- presets -----------------------------------------------------------

    #[test]
    fn timestamp_preset_formats_time() {
        let at = chrono::Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let preset = NewOverlay::timestamp_at(at);
        assert_eq!(preset.content, "2026-03-04 05:06:07");
        assert_eq!((preset.x, preset.y, preset.width, preset.height), (10, 10, 220, 40));
    }

    #[test]
    fn presets_are_valid() {
        assert!(NewOverlay::sample_logo().validate().is_ok());
        assert!(NewOverlay::timestamp().validate().is_ok());
        assert!(NewOverlay::default().validate().is_ok());
    }

    // -- validation --------------------------------------------------------

    #[test]
    fn image_content_must_be_url() {
        assert!(validate_content(OverlayKind::Image, "https://x/y.png").is_ok());
        assert!(validate_content(OverlayKind::Image, "/static/logo.png").is_ok());
        assert!(validate_content(OverlayKind::Image, "").is_err());
        assert!(validate_content(OverlayKind::Image, "logo.png").is_err());
        assert!(validate_content(OverlayKind::Image, "https://x/a b.png").is_err());
    }

    #[test]
    fn text_content_length_limited() {
        assert!(validate_content(OverlayKind::Text, "").is_ok());
        let long = "a".repeat(MAX_TEXT_LENGTH + 1);
        assert!(validate_content(OverlayKind::Text, &long).is_err());
    }

    #[test]
    fn name_length_limited() {
        assert!(validate_name("Logo").is_ok());
        assert!(validate_name(&"n".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn patched_overlay_validates_against_resulting_kind() {
        let mut image = sample();
        image.apply_patch(&OverlayPatch {
            content: Some("not a url".into()),
            ..OverlayPatch::default()
        });
        assert!(image.validate().is_err());

        let mut text = NewOverlay {
            content: "Hello world".into(),
            ..NewOverlay::default()
        }
        .into_overlay(OverlayId::new("t"));
        assert!(text.validate().is_ok());
        text.apply_patch(&OverlayPatch {
            kind: Some(OverlayKind::Image),
            ..OverlayPatch::default()
        });
        assert!(text.validate().is_err());
    }
}
