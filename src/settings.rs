use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Directory scanned for view libraries at startup. If `None`, a
    /// platform default next to the executable is used.
    pub view_dir: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Always draw thumbnail overlays, even when the pointer is elsewhere.
    #[serde(default)]
    pub show_overlays: bool,
    /// Reserve a taller strip at the bottom of each grid cell for the star
    /// row plus a line of metadata.
    #[serde(default)]
    pub extended_thumb_overlay: bool,
    /// Treat grouped images as one unit when resolving the images to act on.
    #[serde(default = "default_grouping")]
    pub grouping: bool,
    /// Scale factor applied to device-independent overlay sizes.
    #[serde(default = "default_ui_scale")]
    pub ui_scale: f32,
    /// External command used to play audio sidecar files. If `None`, the
    /// audio overlay glyph is drawn but playback is disabled.
    pub audio_player: Option<String>,
    /// Persisted expanded state of overlay module panels, keyed by
    /// `"<view>/<module>"`.
    #[serde(default)]
    pub panel_expanded: HashMap<String, bool>,
}

fn default_grouping() -> bool {
    true
}

fn default_ui_scale() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_dir: None,
            debug_logging: false,
            show_overlays: false,
            extended_thumb_overlay: false,
            grouping: true,
            ui_scale: 1.0,
            audio_player: None,
            panel_expanded: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Persisted expanded state for a module panel in a given view, if any
    /// was recorded.
    pub fn panel_expanded(&self, view: &str, module: &str) -> Option<bool> {
        self.panel_expanded.get(&format!("{view}/{module}")).copied()
    }

    pub fn set_panel_expanded(&mut self, view: &str, module: &str, expanded: bool) {
        self.panel_expanded
            .insert(format!("{view}/{module}"), expanded);
    }
}
