//! Speaker line counts and the colour tag each speaker gets.

use std::collections::HashMap;
use std::fmt;

use crate::model::SubtitleEntry;

/// Line counts per speaker, kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SpeakerRanking {
    counts: Vec<(String, usize)>,
}

impl SpeakerRanking {
    /// Tallies every named speaker. Unnamed entries are not counted.
    pub fn count(entries: &[SubtitleEntry]) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for speaker in entries.iter().filter_map(SubtitleEntry::speaker) {
            match index.get(speaker) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(speaker, counts.len());
                    counts.push((speaker.to_string(), 1));
                }
            }
        }

        Self { counts }
    }

    pub fn count_of(&self, speaker: &str) -> usize {
        self.counts
            .iter()
            .find(|(name, _)| name == speaker)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Up to `n` speakers by descending line count; ties keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<String> {
        self.top_with_counts(n).into_iter().map(|(name, _)| name).collect()
    }

    pub fn top_with_counts(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.counts.clone();
        // stable: equal counts stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// The fixed tag set understood by the broadcast player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Yellow,
    LightBlue,
    Magenta,
    Green,
    /// Anyone outside the top four.
    White,
}

impl ColorTag {
    const RANKED: [ColorTag; 4] = [
        ColorTag::Yellow,
        ColorTag::LightBlue,
        ColorTag::Magenta,
        ColorTag::Green,
    ];

    pub fn for_rank(rank: usize) -> Self {
        Self::RANKED.get(rank).copied().unwrap_or(ColorTag::White)
    }

    pub fn tag(self) -> &'static str {
        match self {
            ColorTag::Yellow => "<AN1>",
            ColorTag::LightBlue => "<CN1>",
            ColorTag::Magenta => "<MN1>",
            ColorTag::Green => "<VN1>",
            ColorTag::White => "<BN1>",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Colour for `speaker` given the ranked `top` list.
pub fn color_for(speaker: Option<&str>, top: &[String]) -> ColorTag {
    speaker
        .filter(|s| !s.is_empty())
        .and_then(|s| top.iter().position(|t| t == s))
        .map(ColorTag::for_rank)
        .unwrap_or(ColorTag::White)
}
