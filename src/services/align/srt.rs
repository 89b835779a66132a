//! SRT subtitle model and serialization.

use std::fs;
use std::path::Path;

use crate::errors::AppResult;
use crate::services::align::AlignedSegment;

/// One numbered caption entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    /// 1-based sequential index.
    pub index: usize,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    pub text: String,
}

/// Format a timestamp as `HH:MM:SS,mmm`.
///
/// Computed by integer division/modulo on the second count, not by date/time
/// formatting, so the output is locale-independent.
pub fn format_timestamp(seconds: f64) -> String {
    // Round to whole milliseconds up front; truncating the fractional part
    // directly turns e.g. 3661.234 into 233 ms because of float representation.
    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Flatten aligned segments into word-level caption entries.
///
/// Words are taken in reading order; empty and whitespace-only tokens are
/// dropped before numbering, so indices stay sequential and no zero-duration
/// caption is emitted for them.
pub fn entries_from_segments(segments: &[AlignedSegment]) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut index = 1usize;
    for segment in segments {
        for word in &segment.words {
            let text = word.text.trim();
            if text.is_empty() {
                continue;
            }
            entries.push(SubtitleEntry {
                index,
                start: word.start,
                end: word.end,
                text: text.to_string(),
            });
            index += 1;
        }
    }
    entries
}

fn format_entry(entry: &SubtitleEntry) -> String {
    format!(
        "{}\n{} --> {}\n{}\n",
        entry.index,
        format_timestamp(entry.start),
        format_timestamp(entry.end),
        entry.text
    )
}

/// Serialize entries to `path`, creating parent directories as needed.
/// The full content is assembled before the single write, so a failure never
/// commits a partial subtitle file.
pub fn write_srt(entries: &[SubtitleEntry], path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::align::WordToken;

    #[test]
    fn timestamp_formatting() {
        assert_eq!(format_timestamp(3661.234), "01:01:01,234");
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(59.999), "00:00:59,999");
        assert_eq!(format_timestamp(3600.0), "01:00:00,000");
    }

    fn segment(words: &[(&str, f64, f64)]) -> AlignedSegment {
        AlignedSegment {
            start: words.first().map(|w| w.1).unwrap_or(0.0),
            end: words.last().map(|w| w.2).unwrap_or(0.0),
            text: words.iter().map(|w| w.0).collect::<Vec<_>>().join(" "),
            words: words
                .iter()
                .map(|(text, start, end)| WordToken {
                    text: text.to_string(),
                    start: *start,
                    end: *end,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_words_are_dropped_before_numbering() {
        let segments = vec![segment(&[("Hello", 0.0, 0.4), ("  ", 0.4, 0.4), ("world", 0.5, 0.9)])];
        let entries = entries_from_segments(&segments);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].text, "Hello");
        assert_eq!(entries[1].index, 2);
        assert_eq!(entries[1].text, "world");
    }

    #[test]
    fn srt_entries_are_blank_line_separated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.srt");
        let segments = vec![segment(&[("Hello", 0.0, 0.42), ("world", 0.5, 0.93)])];
        write_srt(&entries_from_segments(&segments), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "1\n00:00:00,000 --> 00:00:00,420\nHello\n\n2\n00:00:00,500 --> 00:00:00,930\nworld\n"
        );
    }
}
