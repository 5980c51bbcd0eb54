pub mod json;
pub mod srt;
pub mod time;
