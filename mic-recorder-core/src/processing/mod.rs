pub mod sample_sink;
pub mod wav_format;
