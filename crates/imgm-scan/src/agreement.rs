//! Cross-capture agreement for one sector.

use imgm_types::Block;

/// Pairwise byte-equality between every pair of captures for one sector.
///
/// `matches(i)` counts every capture `j` (including `i` itself) whose block
/// is byte-identical to capture `i`'s block, so it is always at least 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgreementMatrix {
    len: usize,
    /// Row-major `len * len` equality table.
    equal: Vec<bool>,
    matches: Vec<usize>,
}

impl AgreementMatrix {
    /// Compare every pair of blocks. O(n² · sector size).
    pub fn compute(blocks: &[Block]) -> Self {
        let len = blocks.len();
        let mut equal = vec![false; len * len];

        for i in 0..len {
            equal[i * len + i] = true;
            for j in (i + 1)..len {
                let same = blocks[i] == blocks[j];
                equal[i * len + j] = same;
                equal[j * len + i] = same;
            }
        }

        let matches = (0..len)
            .map(|i| equal[i * len..(i + 1) * len].iter().filter(|&&e| e).count())
            .collect();

        Self {
            len,
            equal,
            matches,
        }
    }

    /// Number of captures compared.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no captures were compared.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of captures identical to capture `source`, itself included.
    pub fn matches(&self, source: usize) -> usize {
        self.matches[source]
    }

    /// Match counts for every capture, in capture order.
    pub fn all_matches(&self) -> &[usize] {
        &self.matches
    }

    /// Whether captures `a` and `b` hold identical blocks.
    pub fn agrees(&self, a: usize, b: usize) -> bool {
        self.equal[a * self.len + b]
    }

    /// Whether every capture holds the same block.
    pub fn is_unanimous(&self) -> bool {
        !self.is_empty() && (0..self.len).all(|other| self.agrees(0, other))
    }
}
