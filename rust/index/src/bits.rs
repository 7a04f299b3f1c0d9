use crate::ConfigurationError;

/// Approximations are packed into a `u128`.
pub const MAX_KEY_BITS: u32 = 128;
/// Each dimension materialises `2^bits + 1` marks.
pub const MAX_BITS_PER_DIMENSION: u32 = 24;

/// Bits per dimension. The first `num_bit % num_dim` dimensions receive one
/// extra bit, so the plan always sums to the full budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPlan {
    bits: Vec<u32>,
    offsets: Vec<u32>,
    num_bit: u32,
}

impl BitPlan {
    pub fn allocate(num_bit: u32, num_dim: usize) -> Result<Self, ConfigurationError> {
        if num_dim == 0 {
            return Err(ConfigurationError::ZeroDimensions);
        }
        if num_bit == 0 {
            return Err(ConfigurationError::ZeroBits);
        }
        if num_bit > MAX_KEY_BITS {
            return Err(ConfigurationError::TooManyBits {
                num_bit,
                max: MAX_KEY_BITS,
            });
        }

        // num_dim may exceed u32 only when num_bit < num_dim, in which case the
        // quotient is 0 and the remainder is num_bit itself.
        let (base, extra) = match u32::try_from(num_dim) {
            Ok(dims) => (num_bit / dims, (num_bit % dims) as usize),
            Err(_) => (0, num_bit as usize),
        };
        let widest = if extra > 0 { base + 1 } else { base };
        if widest > MAX_BITS_PER_DIMENSION {
            return Err(ConfigurationError::TooManyBitsPerDimension {
                bits: widest,
                max: MAX_BITS_PER_DIMENSION,
            });
        }

        let bits = (0..num_dim)
            .map(|dim| if dim < extra { base + 1 } else { base })
            .collect::<Vec<_>>();
        let offsets = bits
            .iter()
            .scan(0u32, |acc, bits| {
                let offset = *acc;
                *acc += bits;
                Some(offset)
            })
            .collect();

        if (num_bit as usize) < num_dim {
            tracing::warn!(
                num_bit,
                num_dim,
                "Bit budget is smaller than the dimensionality, some dimensions get a single bin"
            );
        }

        Ok(Self {
            bits,
            offsets,
            num_bit,
        })
    }

    pub fn num_bit(&self) -> u32 {
        self.num_bit
    }

    pub fn num_dim(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[u32] {
        &self.bits
    }

    pub fn bits_for(&self, dim: usize) -> u32 {
        self.bits[dim]
    }

    /// Position of the dimension's first bit, counted from the most
    /// significant end of the approximation.
    pub fn offset(&self, dim: usize) -> u32 {
        self.offsets[dim]
    }

    pub fn bins(&self, dim: usize) -> usize {
        1usize << self.bits[dim]
    }

    /// Right shift that brings the dimension's field to the low bits.
    pub(crate) fn shift(&self, dim: usize) -> u32 {
        self.num_bit - self.offsets[dim] - self.bits[dim]
    }

    pub(crate) fn mask(&self, dim: usize) -> u128 {
        (1u128 << self.bits[dim]) - 1
    }
}
