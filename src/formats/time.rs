use crate::error::{ConvertError, Result};

/// Converts a frame timecode `hh:mm:ss:ff` into milliseconds at `fps`.
///
/// The frame field is rounded to the nearest millisecond, halves rounding up.
/// Frame counts at or above `fps` are accepted and simply spill into the next second.
pub fn timecode_to_ms(timecode: &str, fps: u32) -> Result<i64> {
    if fps == 0 {
        return Err(ConvertError::format(timecode, "fps must be positive"));
    }

    let parts: Vec<&str> = timecode.trim().split(':').collect();
    if parts.len() != 4 {
        return Err(ConvertError::format(
            timecode,
            "expected four colon-separated fields",
        ));
    }

    let mut fields = [0i64; 4];
    for (slot, raw) in fields.iter_mut().zip(&parts) {
        let raw = raw.trim();
        // `u32::from_str` also takes a leading '+'
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConvertError::format(
                timecode,
                "fields must be non-negative integers",
            ));
        }
        *slot = raw
            .parse::<u32>()
            .map(i64::from)
            .map_err(|_| ConvertError::format(timecode, "fields must be non-negative integers"))?;
    }
    let [h, m, s, ff] = fields;

    let fps = i64::from(fps);
    let frame_ms = (ff * 2000 + fps) / (2 * fps);
    Ok((h * 3600 + m * 60 + s) * 1000 + frame_ms)
}

pub fn format_srt_timestamp(ms: i64) -> String {
    format_timestamp(ms, ',')
}

fn format_timestamp(ms_in: i64, ms_sep: char) -> String {
    let ms = ms_in.max(0);

    let total_seconds = ms / 1000;
    let milli = ms % 1000;

    let sec = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let min = total_minutes % 60;
    let hour = total_minutes / 60;

    format!("{hour:02}:{min:02}:{sec:02}{ms_sep}{milli:03}")
}

/// Parses an SRT display time `hh:mm:ss,mmm` back into milliseconds.
pub fn parse_srt_timestamp(s: &str) -> Result<i64> {
    let t = s.trim();
    if !t.bytes().all(|b| b.is_ascii_digit() || b == b':' || b == b',') {
        return Err(ConvertError::format(t, "unexpected character"));
    }

    let (hms, milli) = t
        .split_once(',')
        .ok_or_else(|| ConvertError::format(t, "missing ',' before milliseconds"))?;

    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return Err(ConvertError::format(t, "expected hh:mm:ss before ','"));
    }

    let h: i64 = parts[0]
        .parse()
        .map_err(|_| ConvertError::format(t, "bad hours"))?;
    let m: i64 = parts[1]
        .parse()
        .map_err(|_| ConvertError::format(t, "bad minutes"))?;
    let sec: i64 = parts[2]
        .parse()
        .map_err(|_| ConvertError::format(t, "bad seconds"))?;
    if milli.len() != 3 {
        return Err(ConvertError::format(t, "milliseconds must have three digits"));
    }
    let milli: i64 = milli
        .parse()
        .map_err(|_| ConvertError::format(t, "bad milliseconds"))?;

    Ok(((h * 60 + m) * 60 + sec) * 1000 + milli)
}
