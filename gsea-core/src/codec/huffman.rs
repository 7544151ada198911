//! Static Huffman coding.
//!
//! Layout: `u64 LE` symbol count, 256 `u64 LE` frequencies, then the code
//! bits packed MSB-first. The decoder rebuilds the tree from the frequency
//! table, so tree construction must be deterministic: ties are broken by node
//! creation order (leaves in byte order, then internal nodes as created).

use super::Codec;
use crate::action::Algorithm;
use crate::error::CodecError;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const SYMBOLS: usize = 256;
const HEADER_LEN: usize = 8 + SYMBOLS * 8;
const MAX_NODES: usize = 2 * SYMBOLS - 1;

pub struct Huffman;

struct Node {
    symbol: u8,
    children: Option<(usize, usize)>,
}

/// Node arena for one encode/decode call; never shared between workers.
struct Tree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl Tree {
    fn build(freqs: &[u64; SYMBOLS]) -> Self {
        let mut nodes = Vec::with_capacity(MAX_NODES);
        let mut heap = BinaryHeap::with_capacity(SYMBOLS);
        for (symbol, &freq) in freqs.iter().enumerate() {
            if freq > 0 {
                heap.push(Reverse((freq, nodes.len())));
                nodes.push(Node {
                    symbol: symbol as u8,
                    children: None,
                });
            }
        }

        loop {
            let Some(Reverse((left_freq, left))) = heap.pop() else {
                return Tree { nodes, root: None };
            };
            let Some(Reverse((right_freq, right))) = heap.pop() else {
                return Tree {
                    nodes,
                    root: Some(left),
                };
            };
            heap.push(Reverse((left_freq.saturating_add(right_freq), nodes.len())));
            nodes.push(Node {
                symbol: 0,
                children: Some((left, right)),
            });
        }
    }

    fn is_leaf(&self, idx: usize) -> bool {
        self.nodes[idx].children.is_none()
    }

    /// Code bits per symbol. A lone leaf at the root gets an empty code.
    fn codes(&self) -> Vec<Vec<bool>> {
        let mut codes = vec![Vec::new(); SYMBOLS];
        let Some(root) = self.root else {
            return codes;
        };
        let mut stack = vec![(root, Vec::new())];
        while let Some((idx, prefix)) = stack.pop() {
            match self.nodes[idx].children {
                None => codes[self.nodes[idx].symbol as usize] = prefix,
                Some((left, right)) => {
                    let mut l = prefix.clone();
                    l.push(false);
                    let mut r = prefix;
                    r.push(true);
                    stack.push((left, l));
                    stack.push((right, r));
                }
            }
        }
        codes
    }
}

struct BitWriter {
    out: Vec<u8>,
    acc: u8,
    filled: u8,
}

impl BitWriter {
    fn new(out: Vec<u8>) -> Self {
        Self { out, acc: 0, filled: 0 }
    }

    fn push(&mut self, bit: bool) {
        if bit {
            self.acc |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        if self.filled == 8 {
            self.out.push(self.acc);
            self.acc = 0;
            self.filled = 0;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.out.push(self.acc);
        }
        self.out
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(b)
}

impl Codec for Huffman {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Huffman
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut freqs = [0u64; SYMBOLS];
        for &b in input {
            freqs[b as usize] += 1;
        }

        let mut out = Vec::with_capacity(HEADER_LEN + input.len() / 2);
        out.extend_from_slice(&(input.len() as u64).to_le_bytes());
        for f in &freqs {
            out.extend_from_slice(&f.to_le_bytes());
        }

        let codes = Tree::build(&freqs).codes();
        let mut bits = BitWriter::new(out);
        for &b in input {
            for &bit in &codes[b as usize] {
                bits.push(bit);
            }
        }
        Ok(bits.finish())
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        if input.len() < HEADER_LEN {
            return Err(CodecError::Truncated("huffman header"));
        }
        let total = read_u64(input);
        let mut freqs = [0u64; SYMBOLS];
        let mut sum = 0u64;
        for (i, f) in freqs.iter_mut().enumerate() {
            *f = read_u64(&input[8 + i * 8..]);
            sum = sum
                .checked_add(*f)
                .ok_or_else(|| CodecError::Corrupt("frequency table overflows".into()))?;
        }
        if sum != total {
            return Err(CodecError::Corrupt(format!(
                "frequency table sums to {sum}, header says {total}"
            )));
        }
        let total = usize::try_from(total)
            .map_err(|_| CodecError::Corrupt("symbol count exceeds address space".into()))?;

        let tree = Tree::build(&freqs);
        let Some(root) = tree.root else {
            return Ok(Vec::new());
        };

        let body = &input[HEADER_LEN..];
        let mut out = Vec::new();
        out.try_reserve_exact(total)
            .map_err(|_| CodecError::Corrupt(format!("cannot allocate {total} bytes")))?;

        if tree.is_leaf(root) {
            out.resize(total, tree.nodes[root].symbol);
            return Ok(out);
        }

        let mut node = root;
        'bits: for &byte in body {
            for shift in (0..8).rev() {
                let Some((left, right)) = tree.nodes[node].children else {
                    return Err(CodecError::Corrupt("walked off the code tree".into()));
                };
                node = if (byte >> shift) & 1 == 0 { left } else { right };
                if tree.is_leaf(node) {
                    out.push(tree.nodes[node].symbol);
                    if out.len() == total {
                        break 'bits;
                    }
                    node = root;
                }
            }
        }

        if out.len() < total {
            return Err(CodecError::Truncated("huffman bitstream"));
        }
        Ok(out)
    }
}
