use crate::{
    mixer::Mixer,
    error::ModelError,
    HASH_SIZE,
};

// Match Model ---------------------------------------------------------------------------------------------------------------- Match Model
const BUF_END:  usize = (8 * HASH_SIZE) - 1; // Window index mask
const HASH_END: usize = HASH_SIZE - 1;       // Rolling hash mask
const MAX_LEN:  usize = 160;

/// Finds the longest match between the bytes just seen and an earlier
/// occurrence of the same context in a sliding window, then predicts each
/// bit of the current byte from the byte that followed the match. The
/// window is keyed by a rolling hash of the whole byte history, so a
/// match only begins once the recent context repeats exactly.
pub struct MatchModel {
    pub(crate) buf: Vec<u8>, // Sliding window of completed bytes
    ht:       Vec<usize>,    // Maps a context hash to the last position it was seen
    hash:     i32,           // Rolling hash of the byte history
    mch_ptr:  usize,         // Position inside the matched region
    mch_len:  usize,         // Current match length in bytes
    pos:      usize,         // Count of completed bytes
}
impl MatchModel {
    pub fn new() -> Result<MatchModel, ModelError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(BUF_END + 1)?;
        buf.resize(BUF_END + 1, 0u8);

        let mut ht = Vec::new();
        ht.try_reserve_exact(HASH_SIZE)?;
        ht.resize(HASH_SIZE, 0usize);

        Ok(MatchModel {
            buf,
            ht,
            hash:     0,
            mch_ptr:  0,
            mch_len:  0,
            pos:      0,
        })
    }

    /// Consume one completed byte: slide the window, advance the rolling
    /// hash, then extend the current match or look for a new one.
    pub fn update(&mut self, byte: u8, c4: i32) {
        self.buf[self.pos & BUF_END] = byte;
        self.pos += 1;
        self.hash = ((self.hash.wrapping_mul(43707) << 4).wrapping_add(c4)) & HASH_END as i32;

        if self.mch_len > 0 {
            if self.mch_len < MAX_LEN {
                self.mch_len += 1;
            }
            self.mch_ptr += 1;
        }
        else {
            // Position 0 doubles as "hash not seen yet", and a position
            // that has slid out of the window cannot be verified.
            self.mch_ptr = self.ht[self.hash as usize];
            if self.mch_ptr != 0 && self.pos - self.mch_ptr <= BUF_END {
                let mut r = self.mch_len + 1;
                while r <= MAX_LEN
                && self.buf[self.pos.wrapping_sub(r) & BUF_END]
                == self.buf[self.mch_ptr.wrapping_sub(r) & BUF_END] {
                    r += 1;
                }
                self.mch_len = r - 1;
            }
        }
        self.ht[self.hash as usize] = self.pos;
    }

    /// Predict the current bit from the matched byte. The match only
    /// stays alive while the bits emitted so far agree with it; on the
    /// first disagreement it is dropped and no input is added.
    pub fn p(&mut self, c0: i32, bpos: usize, mxr: &mut Mixer) {
        if self.mch_len == 0 {
            return;
        }
        let byte = self.buf[self.mch_ptr & BUF_END] as i32;
        if c0 == (byte | 256) >> (8 - bpos) {
            // Confidence grows with match length, logarithmically past 32.
            let mut p = if self.mch_len < 32 {
                self.mch_len as i32
            } else {
                32 + ((self.mch_len as i32 - 32) >> 2)
            };
            if (byte >> (7 - bpos)) & 1 == 0 {
                p = -p;
            }
            mxr.add(p << 6);
        }
        else {
            self.mch_len = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.mch_len
    }
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes 6 to 8 back from the current position, packed and
    /// sign-extended for the deep context hash.
    pub fn older_bytes(&self) -> i32 {
        ((self.buf[self.pos.wrapping_sub(8) & BUF_END] as i8 as i32) << 16)
        | ((self.buf[self.pos.wrapping_sub(7) & BUF_END] as i8 as i32) << 8)
        | (self.buf[self.pos.wrapping_sub(6) & BUF_END] as i8 as i32)
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------
