/// Ingested records, in source order.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub entries: Vec<SubtitleEntry>,
    pub meta: Meta,
}

#[derive(Debug, Clone, Default)]
pub struct Meta {
    /// Number of source records skipped for missing required fields.
    pub skipped_records: usize,
}

/// One subtitle as it moves through the pipeline.
///
/// `dialogue` is a single line until the post-processor wraps it; after that it
/// holds at most one `'\n'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub start_ms: i64,
    pub end_ms: i64,
    /// `None` when the source had no (or an empty) speaker name.
    pub speaker: Option<String>,
    pub dialogue: String,
}

impl SubtitleEntry {
    pub fn new(start_ms: i64, end_ms: i64, speaker: Option<&str>, dialogue: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            speaker: speaker.filter(|s| !s.is_empty()).map(str::to_string),
            dialogue: dialogue.to_string(),
        }
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    /// True only when both entries name the same, non-empty speaker.
    pub fn same_speaker(&self, other: &SubtitleEntry) -> bool {
        matches!((self.speaker(), other.speaker()), (Some(a), Some(b)) if a == b)
    }

    /// Characters a viewer actually reads: everything except line breaks.
    pub fn visible_chars(&self) -> usize {
        self.dialogue.chars().filter(|c| *c != '\n').count()
    }
}
