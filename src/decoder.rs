use crate::{
    predictor::Predictor,
    error::ModelError,
};

/// Range decoder mirroring the encoder: it tracks the same [low, high]
/// narrowing from the same predictions, so comparing the compressed
/// window against the probability split recovers each encoded bit.
pub struct Decoder {
    high:       u32,
    low:        u32,
    predictor:  Predictor,
    x:          u32, // 4 byte sliding window of compressed data
    block:      std::vec::IntoIter<u8>,
}
impl Decoder {
    pub fn new(block: Vec<u8>) -> Result<Decoder, ModelError> {
        let mut d = Decoder {
            high:       0xFFFFFFFF,
            low:        0,
            predictor:  Predictor::new()?,
            x:          0,
            block:      block.into_iter(),
        };
        for _ in 0..4 {
            d.x = (d.x << 8) + d.next_byte() as u32;
        }
        Ok(d)
    }
    fn decompress_bit(&mut self) -> i32 {
        let mut p = self.predictor.p() as u32;
        if p < 2048 { p += 1; }

        let range = self.high - self.low;
        let mid: u32 = self.low + (range >> 12) * p
                       + ((range & 0x0FFF) * p >> 12);

        let mut bit: i32 = 0;
        if self.x <= mid {
            bit = 1;
            self.high = mid;
        }
        else {
            self.low = mid + 1;
        }
        self.predictor.update(bit);

        while ((self.high ^ self.low) & 0xFF000000) == 0 {
            self.high = (self.high << 8) + 255;
            self.low <<= 8;
            self.x = (self.x << 8) + self.next_byte() as u32;
        }
        bit
    }
    /// Decompress block_size bytes, most significant bit first.
    pub fn decompress_block(&mut self, block_size: usize) -> Vec<u8> {
        let mut block: Vec<u8> = Vec::with_capacity(block_size);
        while block.len() < block_size {
            let mut byte: i32 = 1;
            while byte < 256 {
                byte += byte + self.decompress_bit();
            }
            block.push((byte - 256) as u8);
        }
        block
    }
    fn next_byte(&mut self) -> u8 {
        self.block.next().unwrap_or(0)
    }
}
