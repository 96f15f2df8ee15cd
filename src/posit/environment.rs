use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use num_bigint::BigUint;
use tracing::debug;

use crate::{
    bitmask::BitMask,
    error::{PositError, Result},
};

/// Exponent field size shared by every width in the 2022 Posit Standard.
pub const STANDARD_EXPONENT_SIZE: u32 = 2;

/// One posit format: total width plus the maximum exponent field width.
///
/// Every derived constant is computed once in [`PositEnvironment::new`]. Equality and hashing only
/// look at `(size, max_exponent_size)`, so two environments built from the same parameters are
/// interchangeable.
#[derive(Debug, Clone)]
pub struct PositEnvironment {
    size: usize,
    max_exponent_size: u32,
    useed: BigUint,
    sign_bit_mask: BitMask,
    first_regime_bit_position: usize,
    first_regime_bit_mask: BitMask,
}

impl PositEnvironment {
    pub fn new(size: usize, max_exponent_size: u32) -> Result<Self> {
        let invalid = |reason| PositError::InvalidEnvironment {
            size,
            max_exponent_size,
            reason,
        };

        if size < 2 {
            return Err(invalid("no room for a sign bit and a regime bit"));
        }
        let useed_exponent = 1usize
            .checked_shl(max_exponent_size)
            .ok_or_else(|| invalid("exponent field wider than a machine word"))?;
        if useed_exponent >= size {
            return Err(invalid("2^max_exponent_size must be smaller than size"));
        }

        let first_regime_bit_position = size - 2;
        debug!(size, max_exponent_size, "created posit environment");

        Ok(PositEnvironment {
            size,
            max_exponent_size,
            useed: BigUint::from(1u8) << useed_exponent,
            sign_bit_mask: BitMask::new(size).set_bit(size - 1),
            first_regime_bit_position,
            first_regime_bit_mask: BitMask::new(size).set_bit(first_regime_bit_position),
        })
    }

    /// Posit Standard (2022) layout for the given width.
    pub fn standard(size: usize) -> Result<Self> {
        Self::new(size, STANDARD_EXPONENT_SIZE)
    }

    /// Process-wide interned environment for `(size, max_exponent_size)`.
    pub fn shared(size: usize, max_exponent_size: u32) -> Result<Arc<Self>> {
        static REGISTRY: OnceLock<EnvironmentRegistry> = OnceLock::new();
        REGISTRY
            .get_or_init(EnvironmentRegistry::new)
            .get_or_create(size, max_exponent_size)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_exponent_size(&self) -> u32 {
        self.max_exponent_size
    }

    /// `2^(2^max_exponent_size)`.
    pub fn useed(&self) -> &BigUint {
        &self.useed
    }

    /// `log2(useed)`, i.e. how many powers of two one regime step is worth.
    pub fn useed_exponent(&self) -> u64 {
        1 << self.max_exponent_size
    }

    pub fn sign_bit_mask(&self) -> &BitMask {
        &self.sign_bit_mask
    }

    pub fn first_regime_bit_position(&self) -> usize {
        self.first_regime_bit_position
    }

    pub fn first_regime_bit_mask(&self) -> &BitMask {
        &self.first_regime_bit_mask
    }

    /// Regime of maxpos.
    pub fn max_regime(&self) -> i64 {
        self.size as i64 - 2
    }

    /// Regime of minpos.
    pub fn min_regime(&self) -> i64 {
        -self.max_regime()
    }

    pub fn zero_bits(&self) -> BitMask {
        BitMask::new(self.size)
    }

    /// The single reserved non-real pattern, `100...0`.
    pub fn infinite_bits(&self) -> BitMask {
        self.sign_bit_mask.clone()
    }

    /// `011...1`
    pub fn max_pos_bits(&self) -> BitMask {
        BitMask::ones(self.size).clear_bit(self.size - 1)
    }

    /// `000...1`
    pub fn min_pos_bits(&self) -> BitMask {
        BitMask::from_u64(self.size, 1)
    }

    pub fn key(&self) -> (usize, u32) {
        (self.size, self.max_exponent_size)
    }

    pub(crate) fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(PositError::EnvironmentMismatch {
                expected: self.key(),
                found: other.key(),
            })
        }
    }
}

impl PartialEq for PositEnvironment {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PositEnvironment {}

impl Hash for PositEnvironment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Interns environments so equal formats share one allocation.
#[derive(Debug, Default)]
pub struct EnvironmentRegistry {
    environments: Mutex<HashMap<(usize, u32), Arc<PositEnvironment>>>,
}

impl EnvironmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &self,
        size: usize,
        max_exponent_size: u32,
    ) -> Result<Arc<PositEnvironment>> {
        let mut environments = self
            .environments
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(environment) = environments.get(&(size, max_exponent_size)) {
            return Ok(Arc::clone(environment));
        }

        let environment = Arc::new(PositEnvironment::new(size, max_exponent_size)?);
        debug!(size, max_exponent_size, "interned posit environment");
        environments.insert((size, max_exponent_size), Arc::clone(&environment));
        Ok(environment)
    }

    pub fn len(&self) -> usize {
        self.environments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
