//! Compression adapters for the compiled dictionary.
//!
//! A codec turns the dictionary's JSON text into a text payload that can be
//! embedded in generated source or sent over a text channel, and back.
//! The compiler and the resolver must agree on the codec.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::error::CodecError;

pub trait Codec: Send + Sync + fmt::Debug {
    fn compress(&self, text: &str) -> Result<String, CodecError>;
    fn decompress(&self, payload: &str) -> Result<String, CodecError>;
}

/// Raw deflate followed by standard base64. The output is plain ASCII.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeflateBase64;

impl Codec for DeflateBase64 {
    fn compress(&self, text: &str) -> Result<String, CodecError> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes())?;
        Ok(STANDARD.encode(encoder.finish()?))
    }

    fn decompress(&self, payload: &str) -> Result<String, CodecError> {
        let compressed = STANDARD.decode(payload.trim())?;
        let mut bytes = Vec::with_capacity(compressed.len() * 4);
        DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Pass-through codec; handy when inspecting compiled output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Codec for Identity {
    fn compress(&self, text: &str) -> Result<String, CodecError> {
        Ok(text.to_string())
    }

    fn decompress(&self, payload: &str) -> Result<String, CodecError> {
        Ok(payload.to_string())
    }
}

pub fn default_codec() -> Arc<dyn Codec> {
    Arc::new(DeflateBase64)
}
