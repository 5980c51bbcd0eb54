//! Fuses runs of same-speaker entries that sit close together.

use crate::{config::Merge, model::SubtitleEntry};

/// Limits a merge must respect.
#[derive(Debug, Clone, Copy)]
pub struct MergeRules {
    pub max_gap_ms: i64,
    pub allow_overlap: bool,
    /// Budget for the joined dialogue, counted in characters including the joining space.
    pub max_chars: usize,
    pub max_duration_ms: Option<i64>,
}

impl MergeRules {
    pub fn from_config(cfg: &Merge, char_budget: usize) -> Self {
        Self {
            max_gap_ms: cfg.max_gap_ms,
            allow_overlap: cfg.allow_overlap,
            max_chars: char_budget,
            max_duration_ms: cfg.duration_limit(),
        }
    }

    fn gap_ok(&self, gap: i64) -> bool {
        gap <= self.max_gap_ms && (self.allow_overlap || gap >= 0)
    }

    fn accepts(&self, buffer: &SubtitleEntry, next: &SubtitleEntry) -> bool {
        if !buffer.same_speaker(next) {
            return false;
        }
        if !self.gap_ok(next.start_ms - buffer.end_ms) {
            return false;
        }

        let joined_chars = buffer.dialogue.chars().count() + 1 + next.dialogue.chars().count();
        if joined_chars > self.max_chars {
            return false;
        }

        match self.max_duration_ms {
            Some(max) => {
                let span = buffer.end_ms.max(next.end_ms) - buffer.start_ms.min(next.start_ms);
                span <= max
            }
            None => true,
        }
    }
}

/// Single left-to-right pass: each entry is compared against the running buffer,
/// never against the entry it was merged from.
pub fn merge_entries(entries: Vec<SubtitleEntry>, rules: &MergeRules) -> Vec<SubtitleEntry> {
    let mut merged = Vec::with_capacity(entries.len());
    let mut iter = entries.into_iter();

    let Some(mut buffer) = iter.next() else {
        return merged;
    };

    for next in iter {
        if rules.accepts(&buffer, &next) {
            buffer.start_ms = buffer.start_ms.min(next.start_ms);
            buffer.end_ms = buffer.end_ms.max(next.end_ms);
            buffer.dialogue = format!("{} {}", buffer.dialogue, next.dialogue)
                .trim()
                .to_string();
        } else {
            merged.push(std::mem::replace(&mut buffer, next));
        }
    }

    merged.push(buffer);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> MergeRules {
        MergeRules {
            max_gap_ms: 500,
            allow_overlap: false,
            max_chars: 74,
            max_duration_ms: Some(8_000),
        }
    }

    fn e(start: i64, end: i64, speaker: &str, text: &str) -> SubtitleEntry {
        SubtitleEntry::new(start, end, Some(speaker), text)
    }

    #[test]
    fn merges_touching_same_speaker_lines() {
        let out = merge_entries(vec![e(1000, 2000, "A", "Hola"), e(2000, 3000, "A", "amigo")], &rules());
        assert_eq!(out, vec![e(1000, 3000, "A", "Hola amigo")]);
    }

    #[test]
    fn keeps_different_speakers_apart() {
        let out = merge_entries(vec![e(0, 1000, "A", "Hola"), e(1000, 2000, "B", "Hola")], &rules());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn unnamed_speakers_do_not_merge() {
        let input = vec![
            SubtitleEntry::new(0, 1000, None, "uno"),
            SubtitleEntry::new(1000, 2000, Some(""), "dos"),
        ];
        assert_eq!(merge_entries(input, &rules()).len(), 2);
    }

    #[test]
    fn respects_gap_threshold() {
        let out = merge_entries(vec![e(0, 1000, "A", "uno"), e(1500, 2000, "A", "dos")], &rules());
        assert_eq!(out.len(), 1);
        let out = merge_entries(vec![e(0, 1000, "A", "uno"), e(1501, 2000, "A", "dos")], &rules());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn overlap_needs_opt_in() {
        let input = vec![e(0, 1000, "A", "uno"), e(800, 2000, "A", "dos")];
        assert_eq!(merge_entries(input.clone(), &rules()).len(), 2);

        let lenient = MergeRules {
            allow_overlap: true,
            ..rules()
        };
        assert_eq!(merge_entries(input, &lenient), vec![e(0, 2000, "A", "uno dos")]);
    }

    #[test]
    fn respects_char_budget() {
        let strict = MergeRules { max_chars: 7, ..rules() };
        // "uno dos" is exactly 7
        assert_eq!(merge_entries(vec![e(0, 1, "A", "uno"), e(1, 2, "A", "dos")], &strict).len(), 1);
        assert_eq!(merge_entries(vec![e(0, 1, "A", "uno"), e(1, 2, "A", "tres")], &strict).len(), 2);
    }

    #[test]
    fn respects_duration_budget() {
        let input = vec![e(0, 5000, "A", "uno"), e(5000, 9000, "A", "dos")];
        assert_eq!(merge_entries(input.clone(), &rules()).len(), 2);

        let unbounded = MergeRules {
            max_duration_ms: None,
            ..rules()
        };
        assert_eq!(merge_entries(input, &unbounded).len(), 1);
    }

    #[test]
    fn zero_configured_duration_merges_long_runs() {
        let cfg = Merge {
            max_duration_ms: 0,
            ..Merge::default()
        };
        let rules = MergeRules::from_config(&cfg, 74);
        assert_eq!(rules.max_duration_ms, None);

        let input = vec![e(0, 5000, "A", "uno"), e(5000, 9000, "A", "dos")];
        assert_eq!(merge_entries(input, &rules), vec![e(0, 9000, "A", "uno dos")]);
    }

    #[test]
    fn chains_against_running_buffer() {
        // A+B fit; (A+B)+C would exceed the budget even though B+C alone would fit.
        let strict = MergeRules { max_chars: 9, ..rules() };
        let out = merge_entries(
            vec![e(0, 1, "A", "aa"), e(1, 2, "A", "bb"), e(2, 3, "A", "cccc")],
            &strict,
        );
        assert_eq!(out, vec![e(0, 2, "A", "aa bb"), e(2, 3, "A", "cccc")]);

        // and when it fits, all three collapse in one pass
        let loose = MergeRules { max_chars: 20, ..rules() };
        let out = merge_entries(
            vec![e(0, 1, "A", "aa"), e(1, 2, "A", "bb"), e(2, 3, "A", "cccc")],
            &loose,
        );
        assert_eq!(out, vec![e(0, 3, "A", "aa bb cccc")]);
    }

    #[test]
    fn gap_is_measured_from_extended_end() {
        let out = merge_entries(
            vec![e(0, 1000, "A", "uno"), e(1000, 3000, "A", "dos"), e(3400, 4000, "A", "tres")],
            &rules(),
        );
        assert_eq!(out, vec![e(0, 4000, "A", "uno dos tres")]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(merge_entries(Vec::new(), &rules()).is_empty());
    }
}
