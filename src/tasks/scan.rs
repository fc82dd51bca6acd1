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

//! Media file discovery and tag reading.
//!
//! It utilizes `WalkDir` for directory traversal and `Lofty` for metadata
//! extraction.

use std::path::{Path, PathBuf};

use lofty::{file::TaggedFile, prelude::*, probe::Probe};
use log::debug;
use trackview::model::{TrackData, TrackKind};
use url::Url;
use walkdir::WalkDir;

use crate::config::AppConfig;

/// Recursively lists the files under `root` with an accepted extension, in
/// path order.
pub(crate) fn collect_media(root: &Path, config: &AppConfig) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.accepts(ext))
        })
        .map(|e| e.into_path())
        .collect()
}

/// The `file://` locator of `path`, resolved against the working directory.
pub(crate) fn uri_of(path: &Path) -> Option<String> {
    let path = std::path::absolute(path).ok()?;
    Url::from_file_path(path).ok().map(String::from)
}

/// Reads the metadata of one media file.
///
/// A file that no longer exists becomes a missing-kind track; one whose tags
/// cannot be read keeps only its locator, so its title falls back to the file
/// name. Returns `None` when `path` has no `file://` locator.
pub(crate) fn read_track(path: &Path) -> Option<TrackData> {
    let Some(uri) = uri_of(path) else {
        debug!("no locator for {}", path.display());
        return None;
    };
    let mut track = TrackData::new(uri);

    if !path.exists() {
        track.kind = TrackKind::Missing;
        return Some(track);
    }

    match Probe::open(path).and_then(|p| p.read()) {
        Ok(file) => apply_tags(&mut track, &file),
        Err(e) => debug!("no tags for {}: {e}", path.display()),
    }
    Some(track)
}

fn apply_tags(track: &mut TrackData, file: &TaggedFile) {
    track.length = i64::try_from(file.properties().duration().as_nanos()).unwrap_or(-1);
    track.file_type = Some(format!("{:?}", file.file_type()));

    let Some(tag) = file.primary_tag().or_else(|| file.first_tag()) else {
        return;
    };

    track.title = tag.title().map(|s| s.to_string());
    track.artist = tag.artist().map(|s| s.to_string());
    track.album = tag.album().map(|s| s.to_string());
    track.genre = tag.genre().map(|s| s.to_string());
    track.track_number = tag.track();
    track.year = tag.year().and_then(|y| i32::try_from(y).ok());
}

#[cfg(test)]
mod tests {
    use std::fs;

    use trackview::util::format::name_from_uri;

    use super::*;

    #[test]
    fn collects_accepted_extensions_in_order() {
        let root = std::env::temp_dir().join(format!("trackview-scan-{}", std::process::id()));
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/2.ogg"), b"").unwrap();
        fs::write(root.join("a.MP3"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();

        let found = collect_media(&root, &AppConfig::default());
        fs::remove_dir_all(&root).unwrap();

        assert_eq!(found, vec![root.join("a.MP3"), root.join("b/2.ogg")]);
    }

    #[test]
    fn vanished_file_is_missing() {
        let track = read_track(Path::new("/nonexistent/trackview/x.flac")).unwrap();
        assert_eq!(track.kind, TrackKind::Missing);
        assert_eq!(track.uri, "file:///nonexistent/trackview/x.flac");
    }

    #[test]
    fn locators_escape_reserved_characters() {
        let uri = uri_of(Path::new("/music/Blue in Green #2 100%.flac")).unwrap();
        assert_eq!(uri, "file:///music/Blue%20in%20Green%20%232%20100%25.flac");
        assert_eq!(name_from_uri(&uri).as_deref(), Some("Blue in Green #2 100%"));
    }

    #[test]
    fn relative_paths_resolve_against_the_working_directory() {
        let uri = uri_of(Path::new("song.ogg")).unwrap();
        let expected = Url::from_file_path(std::env::current_dir().unwrap().join("song.ogg")).unwrap();
        assert_eq!(uri, expected.as_str());
    }

    #[test]
    fn unreadable_file_keeps_only_its_locator() {
        let path = std::env::temp_dir().join(format!("trackview-bad-{}.mp3", std::process::id()));
        fs::write(&path, b"not audio").unwrap();

        let track = read_track(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(track.kind, TrackKind::Music);
        assert_eq!(track.title, None);
    }
}
