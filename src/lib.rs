//! Context-mixing bit prediction in the PAQ lineage: seven hashed byte
//! contexts mapped through bit-history states, a longest-match model, a
//! context-gated neural mixer, and a secondary estimation pass, paired
//! with a binary range coder.
//!
//! The predictor emits a 12-bit probability before each bit and learns
//! from the bit once it is known; [`Encoder`] and [`Decoder`] drive it
//! from both ends of a compressed stream.

mod logistic;
mod state_table;
mod state_map;
mod match_model;
mod mixer;
mod apm;
mod predictor;
mod encoder;
mod decoder;
mod error;

pub use crate::{
    predictor::Predictor,
    encoder::Encoder,
    decoder::Decoder,
    error::ModelError,
    logistic::{squash, stretch},
};

/// Context hash dimension. The bit-history store is 32 times this, the
/// match window 8 times, so a predictor weighs in around 390 MiB.
pub(crate) const HASH_SIZE: usize = 8 * 1024 * 1024;

/// Compress a block with a fresh model.
pub fn compress(block: &[u8]) -> Result<Vec<u8>, ModelError> {
    Ok(Encoder::new()?.compress_block(block))
}

/// Decompress a block with a fresh model. `len` is the original block
/// length; the stream itself carries no framing.
pub fn decompress(block: Vec<u8>, len: usize) -> Result<Vec<u8>, ModelError> {
    Ok(Decoder::new(block)?.decompress_block(len))
}
