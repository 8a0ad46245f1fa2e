//! Recording file metadata, sorting and filtering

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::SystemTime;

use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::AudioMimeType;

/// Read-only view over one recording file. Recomputed from disk on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingEntry {
    pub path: PathBuf,
    pub name: String,
    pub extension: String,
    pub mime: AudioMimeType,
    pub size_bytes: u64,
    pub modified: SystemTime,
    /// Probed from the container; `None` when probing failed
    pub duration: Option<Duration>,
}

impl RecordingEntry {
    /// File name without the extension
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes;
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Duration as `mm:ss`, or `--:--` when unknown
    pub fn formatted_duration(&self) -> String {
        self.duration
            .map(|d| d.clock())
            .unwrap_or_else(|| "--:--".to_string())
    }
}

/// Sort order for the recordings list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    Name,
    #[default]
    Date,
    Duration,
    Size,
    Type,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [Self::Name, Self::Date, Self::Duration, Self::Size, Self::Type];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Date => "date",
            Self::Duration => "duration",
            Self::Size => "size",
            Self::Type => "type",
        }
    }
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ConfigError::ValidationError {
                key: "sort_mode".to_string(),
                message: format!(
                    "Unknown sort \"{}\". Valid values: name, date, duration, size, type",
                    s
                ),
            })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort entries in place. Unknown durations sort after known ones
/// (before them when reversed).
pub fn sort_entries(entries: &mut [RecordingEntry], key: SortKey, reverse: bool) {
    entries.sort_by(|a, b| {
        let ord = compare(a, b, key);
        if reverse {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn compare(a: &RecordingEntry, b: &RecordingEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Date => a.modified.cmp(&b.modified),
        SortKey::Size => a.size_bytes.cmp(&b.size_bytes),
        SortKey::Type => a.extension.cmp(&b.extension),
        SortKey::Duration => match (a.duration, b.duration) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Keep entries whose name contains `text`, case-insensitively
pub fn filter_entries(entries: Vec<RecordingEntry>, text: &str) -> Vec<RecordingEntry> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn entry(name: &str, size: u64, age_secs: u64, duration: Option<u64>) -> RecordingEntry {
        let extension = name.rsplit_once('.').map(|(_, e)| e).unwrap_or("").to_string();
        RecordingEntry {
            path: PathBuf::from(name),
            name: name.to_string(),
            mime: AudioMimeType::from_extension(&extension).unwrap_or(AudioMimeType::Ogg),
            extension,
            size_bytes: size,
            modified: SystemTime::UNIX_EPOCH + StdDuration::from_secs(age_secs),
            duration: duration.map(Duration::from_secs),
        }
    }

    fn names(entries: &[RecordingEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn sort_by_name_and_reverse() {
        let mut list = vec![entry("b.ogg", 1, 1, None), entry("a.wav", 1, 1, None)];
        sort_entries(&mut list, SortKey::Name, false);
        assert_eq!(names(&list), ["a.wav", "b.ogg"]);
        sort_entries(&mut list, SortKey::Name, true);
        assert_eq!(names(&list), ["b.ogg", "a.wav"]);
    }

    #[test]
    fn sort_by_date_size_type() {
        let mut list = vec![
            entry("old.wav", 300, 10, None),
            entry("new.m4a", 100, 20, None),
            entry("mid.ogg", 200, 15, None),
        ];
        sort_entries(&mut list, SortKey::Date, false);
        assert_eq!(names(&list), ["old.wav", "mid.ogg", "new.m4a"]);
        sort_entries(&mut list, SortKey::Size, false);
        assert_eq!(names(&list), ["new.m4a", "mid.ogg", "old.wav"]);
        sort_entries(&mut list, SortKey::Type, false);
        assert_eq!(names(&list), ["new.m4a", "mid.ogg", "old.wav"]);
    }

    #[test]
    fn unknown_durations_sort_last_then_first_when_reversed() {
        let mut list = vec![
            entry("unknown.ogg", 1, 1, None),
            entry("long.ogg", 1, 1, Some(90)),
            entry("short.ogg", 1, 1, Some(5)),
        ];
        sort_entries(&mut list, SortKey::Duration, false);
        assert_eq!(names(&list), ["short.ogg", "long.ogg", "unknown.ogg"]);
        sort_entries(&mut list, SortKey::Duration, true);
        assert_eq!(names(&list), ["unknown.ogg", "long.ogg", "short.ogg"]);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let list = vec![entry("Meeting.ogg", 1, 1, None), entry("lecture.wav", 1, 1, None)];
        assert_eq!(names(&filter_entries(list.clone(), "meet")), ["Meeting.ogg"]);
        assert_eq!(filter_entries(list, "  ").len(), 2);
    }

    #[test]
    fn stem_and_formatting() {
        let e = entry("take.one.wav", 2048, 1, Some(65));
        assert_eq!(e.stem(), "take.one");
        assert_eq!(e.human_readable_size(), "2.0 KB");
        assert_eq!(e.formatted_duration(), "01:05");
        assert_eq!(entry("x.wav", 500, 1, None).formatted_duration(), "--:--");
        assert_eq!(entry("x.wav", 500, 1, None).human_readable_size(), "500 B");
    }

    #[test]
    fn sort_key_parse() {
        assert_eq!("Duration".parse::<SortKey>().unwrap(), SortKey::Duration);
        assert!("colour".parse::<SortKey>().is_err());
    }
}
