//! Balanced combinatorial code book for labeling projector sample points.
//!
//! Every word of a length-k code has exactly floor(k/2) of its k bits set,
//! so each sample point is lit in (as nearly as possible) half of the
//! projected frames.

use std::collections::HashMap;

use thiserror::Error;

/// Widest word the bitmask representation can hold.
const MAX_WORD_LENGTH: u32 = 32;

/// Errors from code construction and encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// No code within the word-length cap holds the requested capacity.
    #[error("no balanced code of at most {max_bits} bits holds {requested} words")]
    CodebookExhausted { requested: usize, max_bits: u32 },
    /// Encode requested past the end of the code.
    #[error("codeword index {index} out of range for code of {len} words")]
    OutOfRange { index: usize, len: usize },
}

/// Set of temporal bit-positions a sample point lights up in.
///
/// Stored as a bitmask, so equality and reverse lookup are independent of
/// the order the bits were observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Codeword(u32);

impl Codeword {
    pub const EMPTY: Codeword = Codeword(0);

    /// Build a word from bit positions in any order; duplicates collapse.
    pub fn from_bits<I: IntoIterator<Item = u32>>(bits: I) -> Self {
        let mut word = Codeword::EMPTY;
        for bit in bits {
            word.insert(bit);
        }
        word
    }

    pub fn contains(self, bit: u32) -> bool {
        bit < MAX_WORD_LENGTH && self.0 & (1 << bit) != 0
    }

    pub fn insert(&mut self, bit: u32) {
        debug_assert!(bit < MAX_WORD_LENGTH);
        self.0 |= 1 << bit;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits.
    pub fn weight(self) -> u32 {
        self.0.count_ones()
    }

    /// Set bit positions in ascending order.
    pub fn bits(self) -> impl Iterator<Item = u32> {
        let mask = self.0;
        (0..MAX_WORD_LENGTH).filter(move |bit| mask & (1 << bit) != 0)
    }
}

/// Code book of balanced words, ordered by the lexicographic order of their
/// sorted bit-position combinations. Immutable after construction.
pub struct BalancedCode {
    word_length: u32,
    words: Vec<Codeword>,
    index_of: HashMap<Codeword, usize>,
}

impl BalancedCode {
    /// Enumerate every balanced word of the given length.
    pub fn new(word_length: u32) -> Self {
        assert!(
            word_length <= MAX_WORD_LENGTH,
            "word length {word_length} exceeds the {MAX_WORD_LENGTH}-bit cap"
        );
        let words = combinations(word_length, word_length / 2);
        let index_of = words.iter().enumerate().map(|(i, &w)| (w, i)).collect();
        log::debug!("Balanced code: {} words of length {}", words.len(), word_length);
        Self {
            word_length,
            words,
            index_of,
        }
    }

    /// Smallest code holding at least `capacity` words. The count of
    /// balanced words grows monotonically with the word length, so the
    /// search stops at the first satisfying length.
    pub fn with_capacity(capacity: usize) -> Result<Self, CodecError> {
        for k in 0..=MAX_WORD_LENGTH {
            if balanced_count(k) >= capacity as u64 {
                return Ok(Self::new(k));
            }
        }
        Err(CodecError::CodebookExhausted {
            requested: capacity,
            max_bits: MAX_WORD_LENGTH,
        })
    }

    /// Number of temporal frames a pattern sequence over this code projects.
    pub fn word_length(&self) -> u32 {
        self.word_length
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The full enumeration, index order.
    pub fn words(&self) -> &[Codeword] {
        &self.words
    }

    /// Word at `index` in enumeration order.
    pub fn encode(&self, index: usize) -> Result<Codeword, CodecError> {
        self.words.get(index).copied().ok_or(CodecError::OutOfRange {
            index,
            len: self.words.len(),
        })
    }

    /// Index of an observed bit-set, or `None` when the set is not a word
    /// of this code. `None` is the soft noise-rejection outcome, not an
    /// error.
    pub fn decode(&self, word: Codeword) -> Option<usize> {
        self.index_of.get(&word).copied()
    }
}

/// C(k, floor(k/2)) without materializing the words.
fn balanced_count(k: u32) -> u64 {
    binomial(k as u64, (k / 2) as u64)
}

fn binomial(n: u64, m: u64) -> u64 {
    let m = m.min(n - m);
    let mut acc: u64 = 1;
    for i in 0..m {
        acc = acc * (n - i) / (i + 1);
    }
    acc
}

/// m-subsets of 0..k in lexicographic order.
fn combinations(k: u32, m: u32) -> Vec<Codeword> {
    if m > k {
        return Vec::new();
    }
    if m == 0 {
        return vec![Codeword::EMPTY];
    }
    let m = m as usize;
    let mut idx: Vec<u32> = (0..m as u32).collect();
    let mut out = Vec::new();
    loop {
        out.push(Codeword::from_bits(idx.iter().copied()));
        let Some(i) = (0..m).rev().find(|&i| idx[i] != k - (m - i) as u32) else {
            break;
        };
        idx[i] += 1;
        for j in i + 1..m {
            idx[j] = idx[j - 1] + 1;
        }
    }
    out
}
