use crate::logistic::squash;

// Mixer ---------------------------------------------------------------------------------------------------------------------------- Mixer
fn train(inputs: &[i32], weights: &mut [i32], error: i32) {
    for (input, weight) in inputs.iter().zip(weights.iter_mut()) {
        *weight = weight.wrapping_add(input.wrapping_mul(error) >> 16);
    }
}
fn dot_product(inputs: &[i32], weights: &[i32]) -> i64 {
    inputs.iter().zip(weights.iter())
    .map(|(&i, &w)| i as i64 * w as i64).sum()
}

/// Mixes up to 8 stretched predictions per bit using one of n sets of
/// learned weights selected by a context. Inputs and weights are packed
/// into a single flat buffer, 8 inputs followed by 8 weights per context.
pub struct Mixer {
    buffer:  Vec<i32>, // Packed inputs and weights for every context
    cxt:     usize,    // Offset of the selected context
    idx:     usize,    // Number of inputs added for the current bit
    pr:      i32,      // Current prediction
}
impl Mixer {
    pub fn new(n: usize) -> Mixer {
        Mixer {
            buffer:  vec![0; n * 16],
            cxt:     0,
            idx:     0,
            pr:      2048,
        }
    }
    /// Add one stretched prediction (-2047..2047) as the next input.
    pub fn add(&mut self, pr: i32) {
        assert!(self.idx < 8);
        self.buffer[self.cxt + self.idx] = pr;
        self.idx += 1;
    }
    /// Select the set of weights to be used for mixing.
    pub fn set(&mut self, cxt: u32) {
        self.cxt = (cxt as usize) << 4;
    }
    /// Mix the current inputs into a probability (0..4095). Unfilled input
    /// slots are padded with a small positive constant so a model that
    /// skipped this bit leaves the output stable.
    pub fn p(&mut self) -> i32 {
        while self.idx & 7 != 0 {
            self.buffer[self.cxt + self.idx] = 64;
            self.idx += 1;
        }
        let d = dot_product(
            &self.buffer[self.cxt..self.cxt + 8],
            &self.buffer[self.cxt + 8..self.cxt + 16],
        );
        self.pr = squash((d >> 15) as i32);
        self.pr
    }
    /// Adjust the selected weights to reduce the cost of the last
    /// prediction, and reset the input slots for the next bit.
    pub fn update(&mut self, bit: i32) {
        self.idx = 0;
        let error = ((bit << 12) - self.pr) * 7;
        if error == 0 {
            return;
        }
        let (inputs, weights) = self.buffer[self.cxt..self.cxt + 16].split_at_mut(8);
        train(inputs, weights, error);
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrained_mixer_is_neutral() {
        let mut mxr = Mixer::new(16);
        for _ in 0..8 {
            mxr.add(500);
        }
        assert_eq!(mxr.p(), 2048);
    }

    #[test]
    fn training_moves_prediction_toward_bit() {
        let mut mxr = Mixer::new(16);
        for _ in 0..8 {
            mxr.add(500);
        }
        mxr.p();
        mxr.update(0);
        for _ in 0..8 {
            mxr.add(500);
        }
        assert!(mxr.p() < 2048);
    }

    #[test]
    fn contexts_learn_independently() {
        let mut mxr = Mixer::new(16);
        mxr.set(3);
        for _ in 0..8 {
            mxr.add(1000);
        }
        mxr.p();
        mxr.update(1);

        // Weights trained under context 3 do not leak into context 5.
        mxr.set(5);
        for _ in 0..8 {
            mxr.add(1000);
        }
        assert_eq!(mxr.p(), 2048);
    }
}
