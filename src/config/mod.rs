// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file.

use serde::{Deserialize, Serialize};
use trackview::projection::DEFAULT_TITLE_FORMAT;

const CONFIG_NAME: &str = "trackview";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dirs: Vec<String>,
    /// File extensions picked up by an import, without the dot.
    pub extensions: Vec<String>,
    /// Template for the playlist formatted-title column.
    pub title_format: String,
    /// The playlist imported files are appended to.
    pub import_playlist_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dirs: vec![],
            extensions: ["mp3", "flac", "ogg", "opus", "m4a", "wav"]
                .map(String::from)
                .to_vec(),
            title_format: DEFAULT_TITLE_FORMAT.to_string(),
            import_playlist_name: "Imported".to_string(),
        }
    }
}

impl AppConfig {
    pub fn accepts(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Loads the configuration, writing the defaults on first run. An unreadable
/// file falls back to the defaults.
pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        let config = AppConfig::default();
        assert!(config.accepts("FLAC"));
        assert!(!config.accepts("txt"));
    }
}
