/// Dense, growable bitset backed by `u64` words.
///
/// Used for per-slot visibility and for the per-frame set of dirty
/// transform indices. Bits beyond `len()` are always zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitArray {
    words: Vec<u64>,
    len: usize,
}

const WORD_BITS: usize = 64;

fn word_count(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

impl BitArray {
    /// Create a bitset of `len` cleared bits
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; word_count(len)],
            len,
        }
    }

    /// Build a bitset from raw words. Bits at or above `len` are masked off.
    pub fn from_words(mut words: Vec<u64>, len: usize) -> Self {
        words.resize(word_count(len), 0);
        let mut bits = Self { words, len };
        bits.mask_tail();
        bits
    }

    /// Number of addressable bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw storage words, least significant bit first
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Grow or shrink to `len` bits.
    ///
    /// New bits are cleared; shrinking drops the upper bits and keeps
    /// everything below `len` untouched.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(word_count(len), 0);
        self.len = len;
        self.mask_tail();
    }

    /// Read bit `index`. Out-of-range bits read as cleared.
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Write bit `index`, growing the bitset if needed
    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.len {
            if !value {
                return;
            }
            self.resize(index + 1);
        }
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Clear every bit (length unchanged)
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether any bit is set
    pub fn any(&self) -> bool {
        self.words.iter().any(|&w| w != 0)
    }

    /// Call `f` with the index of every set bit, in increasing order
    pub fn traverse_bits<F: FnMut(usize)>(&self, mut f: F) {
        for (word_index, &word) in self.words.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                f(word_index * WORD_BITS + bit);
                bits &= bits - 1;
            }
        }
    }

    /// Indices of all set bits, in increasing order
    pub fn ones(&self) -> Vec<usize> {
        let mut result = Vec::with_capacity(self.count_ones());
        self.traverse_bits(|i| result.push(i));
        result
    }

    /// Bits set in exactly one of `self` and `other`.
    ///
    /// The result has the length of the longer operand.
    pub fn symmetric_difference(&self, other: &BitArray) -> BitArray {
        let len = self.len.max(other.len);
        let words = (0..word_count(len))
            .map(|i| {
                let a = self.words.get(i).copied().unwrap_or(0);
                let b = other.words.get(i).copied().unwrap_or(0);
                a ^ b
            })
            .collect();
        BitArray { words, len }
    }

    fn mask_tail(&mut self) {
        let tail = self.len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "bit_array_tests.rs"]
mod tests;
