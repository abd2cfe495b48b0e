use crate::{
    match_model::MatchModel,
    mixer::Mixer,
    apm::Apm,
    state_table::next_state,
    state_map::STATE_MAP,
    error::ModelError,
    HASH_SIZE,
};

// Predictor -------------------------------------------------------------------------------------------------------------------- Predictor
const ST_END:      usize = (32 * HASH_SIZE) - 1; // State table index mask
const MIXER_SIZE:  usize = 0x1000;
const APM_SIZE:    usize = 0x10000;

// Salts for the five hashed byte contexts.
const C1: i32 = -862048943;
const C2: i32 = 461845907;
const C3: i32 = -430675100;
const C4: i32 = -2048144789;
const C5: i32 = -1028477387;

const HASH1: i32 = 200002979;
const HASH2: i32 = 30005491;
const HASH3: i32 = 50004239;

const NIBBLE_MASK: i32 = -252645136; // 0xF0F0F0F0

fn hash_pair(x: i32, y: i32) -> i32 {
    let h = x.wrapping_mul(HASH1) ^ y.wrapping_mul(HASH2);
    (h >> 1) ^ (h >> 9) ^ (x >> 2) ^ (y >> 3) ^ HASH3
}

/// Predicts one bit at a time from seven hashed byte contexts, a match
/// model, a context-gated neural mixer, and a final SSE pass. Before each
/// bit, `p()` gives P(bit = 1) scaled to 12 bits; after the bit is known,
/// `update()` trains every component and prepares the next prediction.
pub struct Predictor {
    pr:      i32,        // Prediction
    cxt:     i32,        // Partial byte: a leading 1 followed by the bits seen
    cxt4:    i32,        // Last 4 whole bytes, most recent in the low 8 bits
    bits:    usize,      // Number of bits currently in 'cxt'
    h:       [i32; 7],   // Whitened context bases, rebuilt every byte
    sp:      [usize; 7], // Per-context state indices for the current bit
    n_cxts:  usize,      // Live contexts (0 until the first whole byte)
    states:  Vec<u8>,    // Bit history per (context, partial byte)
    mm:      MatchModel, // Model for longest context match
    mxr:     Mixer,      // For weighted averaging of independent predictions
    apm:     Apm,        // Adaptive Probability Map for refining Mixer output
}
impl Predictor {
    pub fn new() -> Result<Predictor, ModelError> {
        let mut states = Vec::new();
        states.try_reserve_exact(ST_END + 1)?;
        states.resize(ST_END + 1, 0u8);

        Ok(Predictor {
            pr:      2048,
            cxt:     1,
            cxt4:    0,
            bits:    0,
            h:       [0; 7],
            sp:      [0; 7],
            n_cxts:  0,
            states,
            mm:      MatchModel::new()?,
            mxr:     Mixer::new(MIXER_SIZE),
            apm:     Apm::new(APM_SIZE)?,
        })
    }

    /// Probability that the next bit is 1, in 0..4096.
    pub fn p(&self) -> i32 {
        assert!(self.pr >= 0 && self.pr < 4096);
        self.pr
    }

    /// Whiten a context so that neighboring inputs spread across the
    /// whole state table instead of clustering.
    fn add_cxt(&mut self, cx: i32) {
        let id = self.n_cxts as i32;
        let cx = cx.wrapping_mul(987654323).wrapping_add(id);
        let cx = cx.rotate_left(16);
        self.h[self.n_cxts] = cx.wrapping_mul(123456791).wrapping_add(id);
        self.n_cxts += 1;
    }

    /// Rebuild the seven contexts from the completed bytes: the skip-two
    /// context, five salted hashes of 1 to 4 recent bytes, and a deep
    /// context reaching 8 bytes back. The deep context drops its low
    /// nibbles when any recent byte has the top bit set, so text and
    /// binary regions key separately.
    fn update_cxts(&mut self) {
        let cxt4 = self.cxt4;
        let is_binary = ((cxt4 >> 31) & 1) | ((cxt4 >> 23) & 1)
                      | ((cxt4 >> 15) & 1) | ((cxt4 >> 7) & 1);
        let shift = (is_binary << 4) as u32;

        self.n_cxts = 0;
        self.add_cxt(cxt4 ^ (cxt4 & 0xFFFF));
        self.add_cxt(hash_pair(C1, cxt4 << 24));
        self.add_cxt(hash_pair(C2, cxt4 << 16));
        self.add_cxt(hash_pair(C3, cxt4 << 8));
        self.add_cxt(hash_pair(C4, cxt4 & NIBBLE_MASK));
        self.add_cxt(hash_pair(C5, cxt4));
        self.add_cxt(hash_pair(cxt4 >> shift, self.mm.older_bytes()));
    }

    pub fn update(&mut self, bit: i32) {
        assert!(bit == 0 || bit == 1);

        // Train the mixer on the bit its last prediction was for.
        self.mxr.update(bit);

        self.bits += 1;
        self.cxt = (self.cxt << 1) | bit;

        if self.cxt > 255 { // Byte boundary
            self.cxt4 = (self.cxt4 << 8) | (self.cxt & 0xFF);
            self.mm.update((self.cxt & 0xFF) as u8, self.cxt4);
            self.cxt = 1;
            self.bits = 0;

            self.mxr.set((self.cxt4 & (MIXER_SIZE as i32 - 1)) as u32);
            self.update_cxts();
        }

        // Advance each live context's bit history, re-point it at the new
        // partial byte, and feed its mapped prediction to the mixer.
        for i in (0..self.n_cxts).rev() {
            if self.sp[i] != 0 {
                self.states[self.sp[i]] = next_state(self.states[self.sp[i]], bit);
            }
            self.sp[i] = (self.h[i].wrapping_add(self.cxt) & ST_END as i32) as usize;
            self.mxr.add(STATE_MAP[(i << 8) | self.states[self.sp[i]] as usize]);
        }

        // Match model input, if a match is alive and still agrees.
        self.mm.p(self.cxt, self.bits, &mut self.mxr);

        // Mix, then refine through the secondary estimation table keyed
        // by the partial byte and the second-most-recent byte.
        let p = self.mxr.p();
        let p = self.apm.p(bit, p, (self.cxt | (self.cxt4 & 0xFF00)) as u32);
        self.pr = p - ((p - 2048) >> 31);
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn update_byte(p: &mut Predictor, byte: u8) {
        for i in (0..8).rev() {
            p.update(((byte >> i) & 1) as i32);
        }
    }

    #[test]
    fn fresh_predictor_is_neutral() {
        let mut p = Predictor::new().unwrap();
        assert_eq!(p.p(), 2048);

        p.update(0);
        assert_eq!(p.cxt, 2);
        assert_eq!(p.bits, 1);
        assert_eq!(p.mm.len(), 0);
        assert_eq!(p.mm.pos(), 0);
        assert!((0..4096).contains(&p.p()));
    }

    #[test]
    fn one_bit_shifts_into_partial_byte() {
        let mut p = Predictor::new().unwrap();
        p.update(1);
        assert_eq!(p.cxt, 3);
        assert_eq!(p.bits, 1);
        p.update(0);
        assert_eq!(p.cxt, 6);
        assert_eq!(p.bits, 2);
    }

    #[test]
    fn byte_boundary_commits_the_byte() {
        let mut p = Predictor::new().unwrap();
        for _ in 0..8 {
            p.update(0);
        }
        assert_eq!(p.cxt, 1);
        assert_eq!(p.bits, 0);
        assert_eq!(p.cxt4, 0);
        assert_eq!(p.mm.pos(), 1);
        assert_eq!(p.mm.buf[0], 0);
        assert_eq!(p.n_cxts, 7);
    }

    #[test]
    fn repeated_bytes_grow_a_match() {
        let mut p = Predictor::new().unwrap();
        let mut lens = Vec::new();
        for _ in 0..16 {
            update_byte(&mut p, 0x41);
            lens.push(p.mm.len());
        }
        // No match until the rolling hash repeats, then one byte per byte.
        assert_eq!(&lens[..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(&lens[6..10], &[6, 7, 8, 9]);
        // On a long enough run the length saturates.
        for _ in 0..200 {
            update_byte(&mut p, 0x41);
        }
        assert_eq!(p.mm.len(), 160);
    }

    #[test]
    fn invariants_hold_over_mixed_input() {
        let mut p = Predictor::new().unwrap();
        let data: Vec<u8> = b"the quick brown fox jumps over the lazy dog. "
            .iter()
            .copied()
            .cycle()
            .take(600)
            .chain((0u16..512).map(|i| (i * 31 >> 3) as u8))
            .collect();

        let mut updates = 0usize;
        for &byte in data.iter() {
            for i in (0..8).rev() {
                p.update(((byte >> i) & 1) as i32);
                updates += 1;

                assert!((0..4096).contains(&p.pr));
                assert!((1..=255).contains(&p.cxt));
                assert_eq!(p.cxt >> p.bits, 1);
                assert!(p.mm.len() <= 160);
                assert_eq!(p.mm.pos(), updates / 8);
                assert_eq!(p.bits == 0, updates % 8 == 0);
            }
        }
    }
}
