//! Dialogue transcript to broadcast SRT conversion.
//!
//! The pipeline reads JSON records carrying frame timecodes, a speaker and a line
//! of dialogue, then runs them through fixed stages:
//!
//! 1. ingestion ([`formats::json`], [`formats::time`]) and cleaning ([`text`])
//! 2. speaker ranking and colour tags ([`speakers`])
//! 3. merging of close same-speaker lines ([`merge`])
//! 4. gap, duration and wrap fixes ([`postprocess`])
//! 5. SRT rendering ([`formats::srt`])
//!
//! [`pipeline::prepare`] and [`pipeline::render`] are pure; [`pipeline::convert_str`]
//! adds logging and [`pipeline::run_convert`] adds file I/O for the command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod formats;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod postprocess;
pub mod progress;
pub mod speakers;
pub mod text;

pub use error::ConvertError;
