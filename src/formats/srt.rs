use crate::{
    error::{ConvertError, Result},
    formats::time::format_srt_timestamp,
    model::SubtitleEntry,
    speakers::ColorTag,
};

/// One SRT block: index, time range, tagged dialogue, blank separator line.
pub fn render_block(index: usize, entry: &SubtitleEntry, tag: ColorTag) -> String {
    format!(
        "{index}\n{} --> {}\n{tag}{}\n",
        format_srt_timestamp(entry.start_ms),
        format_srt_timestamp(entry.end_ms),
        entry.dialogue,
    )
}

/// Incremental SRT renderer: blocks are numbered from 1 and separated by one blank
/// line, so a driver can report progress between them.
#[derive(Debug)]
pub struct SrtWriter {
    out: String,
    written: usize,
}

impl SrtWriter {
    pub fn new(expected: usize) -> Result<Self> {
        if expected == 0 {
            return Err(ConvertError::EmptyOutput);
        }
        Ok(Self {
            out: String::with_capacity(expected * 64),
            written: 0,
        })
    }

    pub fn push(&mut self, entry: &SubtitleEntry, tag: ColorTag) {
        if self.written > 0 {
            self.out.push('\n');
        }
        self.written += 1;
        self.out.push_str(&render_block(self.written, entry, tag));
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(self) -> String {
        self.out
    }
}
