/// Raw unsigned storage for one half of a word.
pub trait HalfBits: Copy {
    fn to_bits(self) -> u64;
    /// Bits above the half's width are dropped by the `merge` that consumes the result.
    fn from_bits(bits: u64) -> Self;
}

macro_rules! half_bits_impl {
    ($($t:ty)*) => {
        $(
            impl HalfBits for $t {
                fn to_bits(self) -> u64 {
                    u64::from(self)
                }
                fn from_bits(bits: u64) -> Self {
                    bits as $t
                }
            }
        )*
    };
}

half_bits_impl!(u8 u16 u32);

/// A type from which you can query the lower and upper bits
pub trait LowerUpper: Sized {
    /// One half of the bits.
    type Half: HalfBits;
    /// Width of one half. Not always the width of `Half`: a `u8` splits into two nibbles.
    const HALF_BITS: u32;
    /// Returns `(lower, upper)`.
    fn split(&self) -> (Self::Half, Self::Half);
    /// Merges `lower` and `upper` back into `Self`.
    fn merge(lower: Self::Half, upper: Self::Half) -> Self;
}

macro_rules! lower_upper_impl {
    ($($whole:ty => $half:ty, $bits:expr;)*) => {
        $(
            impl LowerUpper for $whole {
                type Half = $half;
                const HALF_BITS: u32 = $bits;
                fn split(&self) -> (Self::Half, Self::Half) {
                    let mask: $whole = (1 << $bits) - 1;
                    ((self & mask) as $half, (self >> $bits) as $half)
                }
                fn merge(lower: Self::Half, upper: Self::Half) -> Self {
                    let mask: $whole = (1 << $bits) - 1;
                    (lower as $whole & mask) | ((upper as $whole & mask) << $bits)
                }
            }
        )*
    };
}

lower_upper_impl! {
    u8 => u8, 4;
    u16 => u8, 8;
    u32 => u16, 16;
    u64 => u32, 32;
}

#[test]
fn test_split_merge() {
    let num = 14_322_534u32;
    let (lower, upper) = num.split();
    let merged: u32 = LowerUpper::merge(lower, upper);
    assert_eq!(num, merged);
}

#[test]
fn test_split_nibbles() {
    assert_eq!(0xA5u8.split(), (0x5, 0xA));
    assert_eq!(<u8 as LowerUpper>::merge(0x5, 0xA), 0xA5);
    // Stray bits above the nibble never leak into the other half.
    assert_eq!(<u8 as LowerUpper>::merge(0xF5, 0x1A), 0xA5);
}

#[test]
fn test_split_wide() {
    let (lower, upper) = (0xFFFF_FFFFu64 << 32).split();
    assert_eq!(lower, 0);
    assert_eq!(upper, 0xFFFF_FFFF);
    assert_eq!(0xBEEFu16.split(), (0xEF, 0xBE));
}
