use std::{
    fmt,
    ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr},
};

use num_bigint::BigUint;

const SEGMENT_BITS: usize = u64::BITS as usize;

fn segment_count(width: usize) -> usize {
    width.div_ceil(SEGMENT_BITS)
}

/// Fixed-width bit pattern stored as little-endian `u64` segments.
///
/// Every operation returns a new mask. Bits at or above `width` are always kept at zero, so the
/// derived equality compares both the declared width and the content.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitMask {
    width: usize,
    segments: Vec<u64>,
}

impl BitMask {
    /// Zero-filled pattern of the given width.
    pub fn new(width: usize) -> Self {
        BitMask {
            width,
            segments: vec![0; segment_count(width)],
        }
    }

    /// All bits of the given width set.
    pub fn ones(width: usize) -> Self {
        !Self::new(width)
    }

    pub fn from_u64(width: usize, value: u64) -> Self {
        Self::from_segments(&[value], width)
    }

    /// Re-tags raw segments with a declared width. Missing segments read as zero and bits beyond
    /// `width` are dropped.
    pub fn from_segments(segments: &[u64], width: usize) -> Self {
        let mut result = Self::new(width);
        for (dst, src) in result.segments.iter_mut().zip(segments) {
            *dst = *src;
        }
        result.normalize();
        result
    }

    pub fn from_biguint(width: usize, value: &BigUint) -> Self {
        Self::from_segments(&value.to_u64_digits(), width)
    }

    /// Same storage, different declared width.
    pub fn with_width(&self, width: usize) -> Self {
        Self::from_segments(&self.segments, width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn to_biguint(&self) -> BigUint {
        let digits = self
            .segments
            .iter()
            .flat_map(|&segment| [segment as u32, (segment >> 32) as u32])
            .collect();
        BigUint::new(digits)
    }

    /// The low 64 bits.
    pub fn to_u64(&self) -> u64 {
        self.segments.first().copied().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.segments.iter().all(|&segment| segment == 0)
    }

    pub fn test_bit(&self, position: usize) -> bool {
        position < self.width
            && (self.segments[position / SEGMENT_BITS] >> (position % SEGMENT_BITS)) & 1 == 1
    }

    /// # Panics
    ///
    /// Panics if `position` is outside the declared width.
    pub fn set_bit(&self, position: usize) -> Self {
        assert!(
            position < self.width,
            "bit {position} out of range for width {}",
            self.width
        );
        let mut result = self.clone();
        result.segments[position / SEGMENT_BITS] |= 1 << (position % SEGMENT_BITS);
        result
    }

    /// # Panics
    ///
    /// Panics if `position` is outside the declared width.
    pub fn clear_bit(&self, position: usize) -> Self {
        assert!(
            position < self.width,
            "bit {position} out of range for width {}",
            self.width
        );
        let mut result = self.clone();
        result.segments[position / SEGMENT_BITS] &= !(1 << (position % SEGMENT_BITS));
        result
    }

    /// Logical shift towards the most significant bit; bits shifted past the width are lost.
    pub fn shift_left(&self, n: usize) -> Self {
        let mut result = Self::new(self.width);
        if n >= self.width {
            return result;
        }
        let (words, bits) = (n / SEGMENT_BITS, n % SEGMENT_BITS);
        for i in words..result.segments.len() {
            let src = i - words;
            let mut value = self.segments[src] << bits;
            if bits > 0 && src > 0 {
                value |= self.segments[src - 1] >> (SEGMENT_BITS - bits);
            }
            result.segments[i] = value;
        }
        result.normalize();
        result
    }

    /// Logical shift towards the least significant bit, zero filled.
    pub fn shift_right(&self, n: usize) -> Self {
        let mut result = Self::new(self.width);
        if n >= self.width {
            return result;
        }
        let (words, bits) = (n / SEGMENT_BITS, n % SEGMENT_BITS);
        let len = self.segments.len();
        for i in 0..len - words {
            let src = i + words;
            let mut value = self.segments[src] >> bits;
            if bits > 0 && src + 1 < len {
                value |= self.segments[src + 1] << (SEGMENT_BITS - bits);
            }
            result.segments[i] = value;
        }
        result
    }

    /// Keeps only the `n` least significant bits.
    pub fn mask_low(&self, n: usize) -> Self {
        let mut result = self.clone();
        for (i, segment) in result.segments.iter_mut().enumerate() {
            let start = i * SEGMENT_BITS;
            if start >= n {
                *segment = 0;
            } else if n - start < SEGMENT_BITS {
                *segment &= (1 << (n - start)) - 1;
            }
        }
        result
    }

    /// Adds one, wrapping around at the declared width.
    ///
    /// The carry ripples through at most every segment once.
    pub fn increment(&self) -> Self {
        let mut result = self.clone();
        for segment in result.segments.iter_mut() {
            let (sum, carry) = segment.overflowing_add(1);
            *segment = sum;
            if !carry {
                break;
            }
        }
        result.normalize();
        result
    }

    /// Two's-complement negation restricted to the declared width.
    pub fn twos_complement_negate(&self) -> Self {
        (!self).increment()
    }

    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        assert_eq!(
            self.width, other.width,
            "bitwise operation on masks of different widths"
        );
        let segments = self
            .segments
            .iter()
            .zip(&other.segments)
            .map(|(&a, &b)| op(a, b))
            .collect();
        let mut result = BitMask {
            width: self.width,
            segments,
        };
        result.normalize();
        result
    }

    fn normalize(&mut self) {
        let used = self.width % SEGMENT_BITS;
        if used != 0 {
            if let Some(last) = self.segments.last_mut() {
                *last &= (1 << used) - 1;
            }
        }
    }
}

impl Not for &BitMask {
    type Output = BitMask;

    fn not(self) -> BitMask {
        let mut result = BitMask {
            width: self.width,
            segments: self.segments.iter().map(|segment| !segment).collect(),
        };
        result.normalize();
        result
    }
}

impl Not for BitMask {
    type Output = BitMask;

    fn not(self) -> BitMask {
        !&self
    }
}

impl BitAnd for &BitMask {
    type Output = BitMask;

    fn bitand(self, rhs: Self) -> BitMask {
        self.zip_with(rhs, |a, b| a & b)
    }
}

impl BitOr for &BitMask {
    type Output = BitMask;

    fn bitor(self, rhs: Self) -> BitMask {
        self.zip_with(rhs, |a, b| a | b)
    }
}

impl BitXor for &BitMask {
    type Output = BitMask;

    fn bitxor(self, rhs: Self) -> BitMask {
        self.zip_with(rhs, |a, b| a ^ b)
    }
}

impl Shl<usize> for &BitMask {
    type Output = BitMask;

    fn shl(self, n: usize) -> BitMask {
        self.shift_left(n)
    }
}

impl Shr<usize> for &BitMask {
    type Output = BitMask;

    fn shr(self, n: usize) -> BitMask {
        self.shift_right(n)
    }
}

impl fmt::Binary for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0b")?;
        }
        for position in (0..self.width).rev() {
            write!(f, "{}", u8::from(self.test_bit(position)))?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitMask<{}>({:#b})", self.width, self)
    }
}
