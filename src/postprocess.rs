//! Final timing fixes and line wrapping.
//!
//! Runs over merged entries in order. Each entry is first wrapped (and, with
//! [`Overflow::Split`], cut into continuation entries), then its start is pushed
//! past the previous end plus the minimum gap and its duration brought into
//! `[min_duration_ms, max_duration_ms]`.
//!
//! With a reading speed configured the duration targets `chars / cps` instead of
//! the source span, and the end is additionally held back to the following
//! entry's original start minus the gap. That bound wins over `min_duration_ms`,
//! so such an entry can come out shorter than the minimum. If the bound would
//! put the end before the start, the entry gets exactly `min_duration_ms`.

use crate::{
    config::{ContinuationTiming, Overflow, Timing, Wrap},
    model::SubtitleEntry,
    text::{split_blocks, wrap_two_lines},
};

#[derive(Debug, Clone, Copy)]
pub struct PostRules {
    pub min_gap_ms: i64,
    pub min_duration_ms: i64,
    pub max_duration_ms: i64,
    pub chars_per_second: Option<f64>,
    pub max_line_chars: usize,
    pub overflow: Overflow,
    pub continuation_timing: ContinuationTiming,
}

impl PostRules {
    pub fn from_config(timing: &Timing, wrap: &Wrap) -> Self {
        Self {
            min_gap_ms: timing.min_gap_ms,
            min_duration_ms: timing.min_duration_ms,
            max_duration_ms: timing.max_duration_ms,
            chars_per_second: timing.chars_per_second,
            max_line_chars: wrap.max_line_chars,
            overflow: wrap.overflow,
            continuation_timing: wrap.continuation_timing,
        }
    }

    fn blocks(&self, dialogue: &str) -> Vec<String> {
        match self.overflow {
            Overflow::Allow => vec![wrap_two_lines(dialogue, self.max_line_chars)],
            Overflow::Split => split_blocks(dialogue, self.max_line_chars),
        }
    }

    fn fit_end(&self, entry: &SubtitleEntry, next_start: Option<i64>) -> i64 {
        let start = entry.start_ms;
        let (min, max) = (self.min_duration_ms, self.max_duration_ms);

        let Some(cps) = self.chars_per_second else {
            return start + (entry.end_ms - start).clamp(min, max);
        };

        let target = (entry.visible_chars() as f64 / cps * 1000.0).round() as i64;
        let mut end = start + target.clamp(min, max);
        if let Some(next) = next_start {
            end = end.min(next - self.min_gap_ms);
        }
        if end < start {
            end = start + min;
        }
        end
    }
}

/// Wraps, splits and retimes `entries`. Entries with empty dialogue are dropped.
pub fn postprocess(entries: Vec<SubtitleEntry>, rules: &PostRules) -> Vec<SubtitleEntry> {
    let mut pieces: Vec<SubtitleEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.dialogue.trim().is_empty() {
            continue;
        }
        let blocks = rules.blocks(&entry.dialogue);
        let windows = carve_windows(entry.start_ms, entry.end_ms, &blocks, rules.continuation_timing);
        for (block, (start_ms, end_ms)) in blocks.into_iter().zip(windows) {
            pieces.push(SubtitleEntry {
                start_ms,
                end_ms,
                speaker: entry.speaker.clone(),
                dialogue: block,
            });
        }
    }

    let mut prev_end: Option<i64> = None;
    for i in 0..pieces.len() {
        // not yet adjusted, so this is the original start
        let next_start = pieces.get(i + 1).map(|p| p.start_ms);
        let piece = &mut pieces[i];

        if let Some(prev) = prev_end {
            piece.start_ms = piece.start_ms.max(prev + rules.min_gap_ms);
        }
        piece.end_ms = rules.fit_end(piece, next_start);
        prev_end = Some(piece.end_ms);
    }

    pieces
}

/// Shares `[start, end]` between `blocks`, contiguously and in order.
fn carve_windows(
    start: i64,
    end: i64,
    blocks: &[String],
    timing: ContinuationTiming,
) -> Vec<(i64, i64)> {
    if blocks.len() <= 1 {
        return vec![(start, end)];
    }

    let span = (end - start).max(0);
    let weights: Vec<i64> = match timing {
        ContinuationTiming::Proportional => blocks
            .iter()
            .map(|b| b.chars().filter(|c| *c != '\n').count().max(1) as i64)
            .collect(),
        ContinuationTiming::Even => vec![1; blocks.len()],
    };
    let total: i64 = weights.iter().sum();

    let mut windows = Vec::with_capacity(blocks.len());
    let mut acc = 0;
    let mut cursor = start;
    for w in weights {
        acc += w;
        let boundary = start + span * acc / total;
        windows.push((cursor, boundary));
        cursor = boundary;
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PostRules {
        PostRules {
            min_gap_ms: 24,
            min_duration_ms: 1_000,
            max_duration_ms: 8_000,
            chars_per_second: None,
            max_line_chars: 37,
            overflow: Overflow::Allow,
            continuation_timing: ContinuationTiming::Proportional,
        }
    }

    fn e(start: i64, end: i64, text: &str) -> SubtitleEntry {
        SubtitleEntry::new(start, end, Some("A"), text)
    }

    #[test]
    fn first_entry_may_start_at_zero() {
        let out = postprocess(vec![e(0, 2000, "hola")], &rules());
        assert_eq!((out[0].start_ms, out[0].end_ms), (0, 2000));
    }

    #[test]
    fn pushes_start_past_previous_end_plus_gap() {
        let out = postprocess(vec![e(0, 2000, "uno"), e(2010, 4000, "dos")], &rules());
        assert_eq!(out[1].start_ms, 2024);
        assert_eq!(out[1].end_ms, 4000);
    }

    #[test]
    fn extends_short_and_truncates_long_durations() {
        let out = postprocess(vec![e(0, 300, "uno"), e(5000, 20_000, "dos")], &rules());
        assert_eq!(out[0].end_ms, 1000);
        assert_eq!(out[1].end_ms, 13_000);
    }

    #[test]
    fn inverted_source_times_get_minimum_duration() {
        let out = postprocess(vec![e(5000, 4000, "uno")], &rules());
        assert_eq!((out[0].start_ms, out[0].end_ms), (5000, 6000));
    }

    #[test]
    fn wraps_long_dialogue_on_two_lines() {
        let out = postprocess(
            vec![e(0, 3000, "Esto es una frase bastante larga que no cabe en una línea")],
            &rules(),
        );
        let lines: Vec<&str> = out[0].dialogue.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].chars().count() <= 37);
    }

    #[test]
    fn gap_and_duration_hold_for_every_entry() {
        let input: Vec<SubtitleEntry> = (0..40)
            .map(|i| {
                let start = i * 700 - (i % 3) * 400;
                e(start, start + (i % 5) * 900, "texto de prueba")
            })
            .collect();
        let r = rules();
        let out = postprocess(input, &r);
        for pair in out.windows(2) {
            assert!(pair[1].start_ms >= pair[0].end_ms + r.min_gap_ms);
        }
        for entry in &out {
            let d = entry.end_ms - entry.start_ms;
            assert!((r.min_duration_ms..=r.max_duration_ms).contains(&d), "{d}");
        }
    }

    #[test]
    fn reading_speed_sets_duration() {
        let r = PostRules {
            chars_per_second: Some(10.0),
            ..rules()
        };
        // 25 chars at 10 cps = 2.5s
        let out = postprocess(vec![e(0, 9000, "aaaaa bbbbb ccccc ddddd e")], &r);
        assert_eq!(out[0].end_ms, 2500);
    }

    #[test]
    fn reading_speed_respects_next_start() {
        let r = PostRules {
            chars_per_second: Some(5.0),
            ..rules()
        };
        // wants 5s but the next entry starts at 3s
        let out = postprocess(vec![e(0, 1000, "aaaaa bbbbb ccccc ddddd e"), e(3000, 4000, "x")], &r);
        assert_eq!(out[0].end_ms, 3000 - 24);
        assert_eq!(out[1].start_ms, 3000);
    }

    #[test]
    fn next_start_bound_can_undercut_minimum_duration() {
        let r = PostRules {
            chars_per_second: Some(10.0),
            ..rules()
        };
        let out = postprocess(vec![e(0, 100, "hola"), e(500, 2000, "adiós")], &r);
        assert_eq!(out[0].end_ms, 476);
        assert!(out[0].end_ms - out[0].start_ms < r.min_duration_ms);
        assert_eq!(out[1].start_ms, 500);
    }

    #[test]
    fn end_before_start_falls_back_to_minimum() {
        let r = PostRules {
            chars_per_second: Some(10.0),
            ..rules()
        };
        // the third entry's source start lies before the second entry's start
        let out = postprocess(
            vec![e(0, 2000, "uno"), e(2000, 3000, "dos"), e(1500, 4000, "tres")],
            &r,
        );
        assert_eq!((out[0].start_ms, out[0].end_ms), (0, 1000));
        assert_eq!((out[1].start_ms, out[1].end_ms), (2000, 3000));
        assert_eq!((out[2].start_ms, out[2].end_ms), (3024, 4024));
    }

    #[test]
    fn split_overflow_creates_continuations() {
        let r = PostRules {
            overflow: Overflow::Split,
            max_line_chars: 10,
            ..rules()
        };
        let text = "uno dos tres cuatro cinco seis siete ocho nueve";
        let out = postprocess(vec![e(0, 9000, text), e(9500, 11_000, "fin")], &r);
        assert!(out.len() > 2);
        assert_eq!(out.last().unwrap().dialogue, "fin");
        for entry in &out {
            assert_eq!(entry.speaker.as_deref(), Some("A"));
            assert!(entry.dialogue.matches('\n').count() <= 1);
            for line in entry.dialogue.lines() {
                assert!(line.chars().count() <= 10);
            }
            assert!(entry.end_ms >= entry.start_ms);
        }
        for pair in out.windows(2) {
            assert!(pair[1].start_ms >= pair[0].end_ms + r.min_gap_ms);
        }
    }

    #[test]
    fn even_continuation_timing_shares_span_equally() {
        let blocks = vec!["a".to_string(), "bbbbbbbbb".to_string()];
        assert_eq!(
            carve_windows(0, 4000, &blocks, ContinuationTiming::Even),
            vec![(0, 2000), (2000, 4000)]
        );
        assert_eq!(
            carve_windows(0, 4000, &blocks, ContinuationTiming::Proportional),
            vec![(0, 400), (400, 4000)]
        );
    }

    #[test]
    fn carving_inverted_span_gives_empty_windows() {
        let blocks = vec!["a".to_string(), "b".to_string()];
        for (s, e) in carve_windows(1000, 500, &blocks, ContinuationTiming::Even) {
            assert!(e >= s);
        }
    }

    #[test]
    fn drops_empty_dialogue() {
        let out = postprocess(vec![e(0, 1000, "  "), e(2000, 3000, "hola")], &rules());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_ms, 2000);
    }
}
