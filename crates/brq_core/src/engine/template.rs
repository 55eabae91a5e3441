//! Render-name template resolution and validation.
//!
//! Entry names may carry placeholders like `{Camera}` that are filled in
//! from the entry's resolved attributes. Matching is case-insensitive and
//! `{Scene State}` / `{State Set}` are aliases for the same value. The
//! `Default` name sentinel stands for the bare `{Camera}` template.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::entries::is_default_field;

use super::errors::{EntryError, EntryResult};

/// Characters that may not appear anywhere in a resolved render name.
pub const RESERVED_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '<', '>', '|', '"'];

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\{(camera|scene state|state set|render preset|layer preset|resolution|pixel aspect)\}",
    )
    .unwrap()
});

/// Resolved attribute values placeholders draw from.
///
/// `camera` is the live camera name with the physical-camera suffix already
/// stripped; `resolution` is the display form (`"WxH"`); the rest are the
/// entry's raw field values.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    pub camera: String,
    pub scene_config: String,
    pub render_preset: String,
    pub layer_preset: String,
    pub resolution: String,
    pub pixel_aspect: String,
}

impl TemplateValues {
    fn value_for(&self, tag: &str) -> &str {
        match tag.to_ascii_lowercase().as_str() {
            "camera" => &self.camera,
            "scene state" | "state set" => &self.scene_config,
            "render preset" => &self.render_preset,
            "layer preset" => &self.layer_preset,
            "resolution" => &self.resolution,
            "pixel aspect" => &self.pixel_aspect,
            _ => "",
        }
    }
}

/// Result of template substitution, before validation.
#[derive(Debug, Clone)]
pub struct ResolvedName {
    /// The substituted name.
    pub name: String,
    /// The raw name field, kept for prompts and error messages.
    pub original: String,
    /// Whether any matched placeholder substituted an empty value.
    pub blank_values: bool,
}

/// Substitute every placeholder in the raw name field.
///
/// A placeholder whose value is empty or the literal word "default"
/// substitutes as empty and raises the blank-value flag so callers can
/// warn before committing to an odd file name.
pub fn resolve(raw_name: &str, values: &TemplateValues) -> ResolvedName {
    let template = if is_default_field(raw_name) {
        "{Camera}"
    } else {
        raw_name
    };

    let mut blank_values = false;
    let name = PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let value = values.value_for(&caps[1]);
            if value.is_empty() || value.eq_ignore_ascii_case("default") {
                blank_values = true;
                String::new()
            } else {
                value.to_string()
            }
        })
        .into_owned();

    ResolvedName {
        name,
        original: raw_name.to_string(),
        blank_values,
    }
}

/// Check a resolved name is safe to use as a file stem.
pub fn validate(name: &str) -> EntryResult<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(RESERVED_NAME_CHARS) {
        return Err(EntryError::invalid_name(name));
    }
    Ok(())
}

/// Strip the physical-camera marker from a camera name.
pub fn strip_camera_suffix(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return name.to_string();
    }
    name.replace(suffix, "")
}
