use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};

use crate::{
    cli::ConvertCmd,
    config::Config,
    error::ConvertError,
    formats::{self, srt::SrtWriter},
    merge::{MergeRules, merge_entries},
    model::SubtitleEntry,
    postprocess::{PostRules, postprocess},
    progress::{BarProgress, Flow, ProgressObserver},
    speakers::{SpeakerRanking, color_for},
    text::clean_dialogue,
};

/// Entries ready to render, plus what the driver reports about them.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub entries: Vec<SubtitleEntry>,
    pub ranking: SpeakerRanking,
    pub top_speakers: Vec<String>,
    pub stats: StageStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    pub ingested: usize,
    pub skipped_records: usize,
    pub dropped_empty: usize,
    pub merged: usize,
    pub finalized: usize,
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub srt: String,
    pub top_speakers: Vec<(String, usize)>,
    pub stats: StageStats,
}

/// Ingest, clean, rank, merge and post-process. Pure: no I/O, no logging.
pub fn prepare(raw: &str, origin: &str, cfg: &Config) -> std::result::Result<Prepared, ConvertError> {
    let transcript = formats::json::parse_json(raw, origin, &cfg.input)?;
    let ingested = transcript.entries.len();

    let cleaned: Vec<SubtitleEntry> = transcript
        .entries
        .into_iter()
        .map(|mut e| {
            e.dialogue = clean_dialogue(&e.dialogue, cfg.input.cleaning);
            e
        })
        .collect();

    // every ingested line counts toward its speaker, even one cleaned down to nothing
    let ranking = SpeakerRanking::count(&cleaned);
    let top_speakers = ranking.top(cfg.speakers.top_n);

    let entries: Vec<SubtitleEntry> = cleaned
        .into_iter()
        .filter(|e| !e.dialogue.is_empty())
        .collect();
    let dropped_empty = ingested - entries.len();

    let entries = if cfg.merge.enabled {
        let rules = MergeRules::from_config(&cfg.merge, cfg.merge.char_budget(&cfg.wrap));
        merge_entries(entries, &rules)
    } else {
        entries
    };
    let merged = entries.len();

    let entries = postprocess(entries, &PostRules::from_config(&cfg.timing, &cfg.wrap));

    Ok(Prepared {
        stats: StageStats {
            ingested,
            skipped_records: transcript.meta.skipped_records,
            dropped_empty,
            merged,
            finalized: entries.len(),
        },
        entries,
        ranking,
        top_speakers,
    })
}

/// Renders `prepared`, reporting to `observer` after every `every`-th block and
/// once more at 100%.
pub fn render<O>(
    prepared: &Prepared,
    every: usize,
    observer: &mut O,
) -> std::result::Result<String, ConvertError>
where
    O: ProgressObserver + ?Sized,
{
    let total = prepared.entries.len();
    let every = every.max(1);
    let mut writer = SrtWriter::new(total)?;

    for entry in &prepared.entries {
        writer.push(entry, color_for(entry.speaker(), &prepared.top_speakers));

        let done = writer.written();
        // the last block is reported once, below, where it can no longer cancel
        if done % every == 0 && done < total {
            let percent = done as f64 / total as f64 * 100.0;
            if observer.on_progress(percent) == Flow::Stop {
                return Err(ConvertError::Cancelled { percent });
            }
        }
    }

    // rendering is complete; a stop request here has nothing left to abort
    let _ = observer.on_progress(100.0);
    Ok(writer.finish())
}

/// Full in-memory conversion with logging around the pure stages.
pub fn convert_str<O>(
    raw: &str,
    origin: &str,
    cfg: &Config,
    observer: &mut O,
) -> std::result::Result<Conversion, ConvertError>
where
    O: ProgressObserver + ?Sized,
{
    cfg.validate()?;

    let prepared = prepare(raw, origin, cfg)?;
    let stats = prepared.stats;

    let top_speakers: Vec<(String, usize)> = prepared
        .top_speakers
        .iter()
        .map(|name| (name.clone(), prepared.ranking.count_of(name)))
        .collect();

    tracing::info!(top_n = cfg.speakers.top_n, "top speakers by line count");
    for (rank, (name, lines)) in top_speakers.iter().enumerate() {
        tracing::info!(rank = rank + 1, speaker = name.as_str(), lines, "top speaker");
    }

    tracing::info!(
        ingested = stats.ingested,
        skipped_records = stats.skipped_records,
        dropped_empty = stats.dropped_empty,
        merged = stats.merged,
        finalized = stats.finalized,
        "pipeline stages complete"
    );

    log_entry_samples(&prepared.entries, cfg);

    let srt = render(&prepared, cfg.progress.every, observer)?;

    Ok(Conversion {
        srt,
        top_speakers,
        stats,
    })
}

pub fn run_convert(cmd: ConvertCmd, cfg: &Config) -> Result<()> {
    let mut cfg = cfg.clone();
    if let Some(fps) = cmd.fps {
        cfg.input.fps = fps;
    }

    let span = tracing::info_span!("convert", input = cmd.input.as_str(), fps = cfg.input.fps);
    let _g = span.enter();

    let out_path = if cmd.stdout {
        None
    } else {
        let p = derive_output_path(&cmd)?;
        if Path::new(&p).exists() && !cmd.overwrite {
            return Err(anyhow!(
                "refusing to overwrite existing file (pass --overwrite): {p}"
            ));
        }
        Some(p)
    };

    let raw = read_input_to_string(&cmd.input)?;
    tracing::info!(bytes = raw.len(), "read input");

    let mut bar = BarProgress::new(!cmd.stdout && !cmd.no_progress);
    let result = convert_str(&raw, &cmd.input, &cfg, &mut bar);
    bar.finish();
    let conversion =
        result.with_context(|| format!("failed converting {} to SRT", cmd.input))?;

    match out_path {
        None => {
            print!("{}", conversion.srt);
            tracing::info!(mode = "stdout", "wrote output");
        }
        Some(p) => {
            write_output(&p, &conversion.srt)?;
            tracing::info!(
                path = p.as_str(),
                entries = conversion.stats.finalized,
                "wrote output file"
            );
        }
    }

    Ok(())
}

fn read_input_to_string(input: &str) -> std::result::Result<String, ConvertError> {
    let unreadable = |e: std::io::Error| ConvertError::Parse {
        path: input.into(),
        reason: e.to_string(),
    };

    if input == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(unreadable)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).map_err(unreadable)
    }
}

fn log_entry_samples(entries: &[SubtitleEntry], cfg: &Config) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let n = cfg.logging.debug_entry_samples.min(entries.len());
        for (i, e) in entries.iter().take(n).enumerate() {
            tracing::debug!(
                idx = i,
                start_ms = e.start_ms,
                end_ms = e.end_ms,
                speaker = e.speaker().unwrap_or(""),
                lines = e.dialogue.lines().count(),
                chars = e.visible_chars(),
                "entry sample"
            );
        }
    }
}

fn derive_output_path(cmd: &ConvertCmd) -> Result<String> {
    if let Some(o) = &cmd.output {
        return Ok(o.clone());
    }

    if cmd.input == "-" {
        return Err(anyhow!(
            "output path required when input is stdin and --stdout is not set"
        ));
    }

    let p = Path::new(&cmd.input);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad input filename"))?;

    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let out = parent.join(format!("{stem}.srt"));
    Ok(out.to_string_lossy().to_string())
}

fn write_output(path: &str, data: &str) -> std::result::Result<(), ConvertError> {
    fs::write(path, data).map_err(|source| ConvertError::Write {
        path: path.into(),
        source,
    })
}
