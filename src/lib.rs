//! PCM Sine Library
//!
//! Sine tone generation, PCM frame packing and framed playback to a blocking audio sink.

pub mod audio;
pub mod engine;
pub mod generate;
