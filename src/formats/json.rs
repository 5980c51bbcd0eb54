use serde_json::{Map, Value};

use crate::{
    config::Input,
    error::{ConvertError, Result},
    formats::time::timecode_to_ms,
    model::{Meta, SubtitleEntry, Transcript},
};

/// Reads dialogue records out of a JSON document.
///
/// Accepts either a bare array of records or an object with a `data` array.
/// Records lacking any of the start, end or dialogue fields are skipped; a
/// malformed timecode in a kept record fails the whole parse. The dialogue is
/// taken verbatim; cleaning happens later.
pub fn parse_json(input: &str, origin: &str, cfg: &Input) -> Result<Transcript> {
    let v: Value = serde_json::from_str(input).map_err(|e| ConvertError::Parse {
        path: origin.into(),
        reason: e.to_string(),
    })?;

    let records = match &v {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => obj
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    let mut entries = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for record in records {
        let Some(obj) = record.as_object() else {
            skipped += 1;
            continue;
        };
        match parse_record(obj, cfg)? {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }

    if entries.is_empty() {
        return Err(ConvertError::NoData);
    }

    Ok(Transcript {
        entries,
        meta: Meta {
            skipped_records: skipped,
        },
    })
}

fn parse_record(obj: &Map<String, Value>, cfg: &Input) -> Result<Option<SubtitleEntry>> {
    let field = |name: &str| obj.get(name).and_then(Value::as_str);

    let (Some(start), Some(end), Some(dialogue)) = (
        field(&cfg.start_field),
        field(&cfg.end_field),
        field(&cfg.dialogue_field),
    ) else {
        return Ok(None);
    };

    let start_ms = timecode_to_ms(start, cfg.fps)?;
    let end_ms = timecode_to_ms(end, cfg.fps)?;
    let speaker = field(&cfg.speaker_field).map(str::trim);

    Ok(Some(SubtitleEntry::new(start_ms, end_ms, speaker, dialogue)))
}
