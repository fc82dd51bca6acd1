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

use url::Url;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Formats a duration in nanoseconds into a `MM:SS` string.
///
/// Negative durations (unknown length) render as `00:00`; minutes are not
/// wrapped into hours.
///
/// # Examples
///
/// ```
/// use trackview::util::format::format_time;
///
/// assert_eq!(format_time(65_000_000_000), "01:05");
/// assert_eq!(format_time(3_600_000_000_000), "60:00");
/// ```
pub fn format_time(nanos: i64) -> String {
    let total_seconds = nanos.max(0) / NANOS_PER_SECOND;
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Derives a display name from a `file://` locator: the decoded file name
/// with its extension removed.
///
/// Returns `None` for other schemes, for strings that are not locators and
/// for locators with no usable file name.
pub fn name_from_uri(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    if url.path().ends_with('/') {
        return None;
    }
    let path = url.to_file_path().ok()?;
    let stem = path.file_stem()?.to_string_lossy();
    (!stem.is_empty()).then(|| stem.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59_999_999_999), "00:59");
        assert_eq!(format_time(-1), "00:00");
        assert_eq!(format_time(754 * NANOS_PER_SECOND), "12:34");
    }

    #[test]
    fn name_strips_directory_and_extension() {
        let name = |uri| name_from_uri(uri);
        assert_eq!(name("file:///music/Song.flac"), Some("Song".into()));
        assert_eq!(name("file:///music/archive.tar.gz"), Some("archive.tar".into()));
        assert_eq!(name("file:///music/.hidden"), Some(".hidden".into()));
    }

    #[test]
    fn name_is_percent_decoded() {
        assert_eq!(
            name_from_uri("file:///music/Blue%20in%20Green.flac"),
            Some("Blue in Green".into())
        );
        assert_eq!(
            name_from_uri("file:///music/100%25%20%23one.ogg"),
            Some("100% #one".into())
        );
    }

    #[test]
    fn only_file_locators_have_names() {
        assert_eq!(name_from_uri("file:///music/"), None);
        assert_eq!(name_from_uri("http://example.com/a.mp3"), None);
        assert_eq!(name_from_uri("/music/a.mp3"), None);
        assert_eq!(name_from_uri(""), None);
    }
}
