//! Fixed-width hardware registers that can be addressed as one value or as two
//! independently addressable halves.
//!
//! A 16-bit register pair such as `BC` is a `HighLow16`: `get_high` yields `B`,
//! `get_low` yields `C`. The `NegHighLow*` variants read and write the halves as
//! two's-complement numbers instead.
//!
//! Half writes are range checked and never partially applied. Whole-value writes
//! are not checked; the caller owns that value.

#[macro_use]
extern crate log;
extern crate byteorder;

pub mod util {
    mod lower_upper;
    pub use self::lower_upper::{HalfBits, LowerUpper};
}
mod field;
mod rw;

pub use crate::field::{BitField, RangeViolation};
pub use crate::rw::WordRw;

use crate::util::{HalfBits, LowerUpper};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Lossless conversion to, and wrapping conversion from, `i128`.
pub trait Int: Copy + PartialEq + fmt::Debug {
    fn to_i128(self) -> i128;
    /// Keeps the low bits of `value`. Only called with values that fit.
    fn from_i128(value: i128) -> Self;
}

macro_rules! int_impl {
    ($($t:ty)*) => {
        $(
            impl Int for $t {
                fn to_i128(self) -> i128 {
                    i128::from(self)
                }
                fn from_i128(value: i128) -> Self {
                    value as $t
                }
            }
        )*
    };
}

int_impl!(u8 i8 u16 i16 u32 i32 u64 i64);

/// The native storage of a register: `u8`, `u16`, `u32` or `u64`.
pub trait Word:
    LowerUpper + WordRw + Int + Default + Eq + Hash + fmt::LowerHex + Send + Sync + 'static
{
    const BITS: u32;
    /// Same width, signed. The operand type of signed half writes.
    type Signed: Int;
    /// Smallest native type holding an unsigned half.
    type UnsignedHalf: Int;
    /// Smallest native type holding a signed half.
    type SignedHalf: Int;
    /// Drops every bit at or above `BITS`.
    fn truncate(value: u64) -> Self;
}

macro_rules! word_impl {
    ($($t:ty => $signed:ty, $uhalf:ty, $ihalf:ty;)*) => {
        $(
            impl Word for $t {
                const BITS: u32 = <$t>::BITS;
                type Signed = $signed;
                type UnsignedHalf = $uhalf;
                type SignedHalf = $ihalf;
                fn truncate(value: u64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

word_impl! {
    u8 => i8, u8, i8;
    u16 => i16, u8, i8;
    u32 => i32, u16, i16;
    u64 => i64, u32, i32;
}

/// How the halves of a register are interpreted.
pub trait Signedness: Copy + Default + Eq + Hash + fmt::Debug + 'static {
    const SIGNED: bool;
    /// What `get_low`/`get_high` return.
    type Half<W: Word>: Int;
    /// What `set_low`/`set_high` accept. Full register width, so that a
    /// computed operand can be written to a half and rejected if it overflows.
    type Operand<W: Word>: Int;
}

/// Halves are plain unsigned numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unsigned;

/// Halves are two's-complement numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signed;

impl Signedness for Unsigned {
    const SIGNED: bool = false;
    type Half<W: Word> = W::UnsignedHalf;
    type Operand<W: Word> = W;
}

impl Signedness for Signed {
    const SIGNED: bool = true;
    type Half<W: Word> = W::SignedHalf;
    type Operand<W: Word> = W::Signed;
}

/// Selects one half of a register at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Half {
    /// Bits `[0, width / 2)`.
    Low,
    /// Bits `[width / 2, width)`.
    High,
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match *self {
            Half::Low => "low",
            Half::High => "high",
        };
        f.write_str(str)
    }
}

/// A register of `W::BITS` bits with two addressable halves.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SplitRegister<W: Word, S: Signedness = Unsigned> {
    value: W,
    signedness: PhantomData<S>,
}

pub type HighLow8 = SplitRegister<u8, Unsigned>;
pub type HighLow16 = SplitRegister<u16, Unsigned>;
pub type HighLow32 = SplitRegister<u32, Unsigned>;
pub type HighLow64 = SplitRegister<u64, Unsigned>;
pub type NegHighLow8 = SplitRegister<u8, Signed>;
pub type NegHighLow16 = SplitRegister<u16, Signed>;
pub type NegHighLow32 = SplitRegister<u32, Signed>;
pub type NegHighLow64 = SplitRegister<u64, Signed>;

impl<W: Word, S: Signedness> SplitRegister<W, S> {
    /// Total width in bits.
    pub const WIDTH: u32 = W::BITS;
    /// Width of one half in bits.
    pub const HALF_WIDTH: u32 = W::HALF_BITS;

    /// A cleared register.
    pub fn new() -> Self {
        Self::with_value(W::default())
    }
    /// A register holding `value`, unchecked like `set_register_value`.
    pub fn with_value(value: W) -> Self {
        SplitRegister {
            value,
            signedness: PhantomData,
        }
    }
    /// Builds a register from its halves. Fails without building anything if
    /// either half is out of range.
    pub fn from_halves(high: S::Operand<W>, low: S::Operand<W>) -> Result<Self, RangeViolation> {
        let field = Self::half_field();
        let upper = field.encode(high.to_i128())?;
        let lower = field.encode(low.to_i128())?;
        Ok(Self::with_value(W::merge(
            W::Half::from_bits(lower),
            W::Half::from_bits(upper),
        )))
    }

    fn half_field() -> BitField {
        BitField {
            lsb: 0,
            width: W::HALF_BITS,
            signed: S::SIGNED,
        }
    }

    pub fn get_register_value(&self) -> W {
        self.value
    }
    /// Unchecked: every bit pattern of `W` is a valid register value.
    pub fn set_register_value(&mut self, value: W) {
        self.value = value;
    }
    /// Loads a value computed at a wider width. Bits at or above `WIDTH` are dropped.
    pub fn set_register_value_truncating(&mut self, value: u64) {
        let truncated = W::truncate(value);
        if u128::from(value) >> W::BITS != 0 {
            warn!(
                "Truncating {:#x} to the {}-bit value {:#x}",
                value,
                W::BITS,
                truncated
            );
        }
        self.value = truncated;
    }
    pub fn clear_register_value(&mut self) {
        self.value = W::default();
    }

    pub fn get_low(&self) -> S::Half<W> {
        let (lower, _) = self.value.split();
        Self::decode(lower)
    }
    pub fn get_high(&self) -> S::Half<W> {
        let (_, upper) = self.value.split();
        Self::decode(upper)
    }
    pub fn get_half(&self, half: Half) -> S::Half<W> {
        match half {
            Half::Low => self.get_low(),
            Half::High => self.get_high(),
        }
    }
    /// Returns `(high, low)`.
    pub fn halves(&self) -> (S::Half<W>, S::Half<W>) {
        (self.get_high(), self.get_low())
    }

    /// Replaces the low half. On error the register is left exactly as it was.
    pub fn set_low(&mut self, value: S::Operand<W>) -> Result<(), RangeViolation> {
        self.set_half(Half::Low, value)
    }
    /// Replaces the high half. On error the register is left exactly as it was.
    pub fn set_high(&mut self, value: S::Operand<W>) -> Result<(), RangeViolation> {
        self.set_half(Half::High, value)
    }
    pub fn set_half(&mut self, half: Half, value: S::Operand<W>) -> Result<(), RangeViolation> {
        let bits = match Self::half_field().encode(value.to_i128()) {
            Ok(bits) => W::Half::from_bits(bits),
            Err(e) => {
                debug!("Rejected {} half write to {}-bit register: {}", half, W::BITS, e);
                return Err(e);
            }
        };
        let (lower, upper) = self.value.split();
        self.value = match half {
            Half::Low => W::merge(bits, upper),
            Half::High => W::merge(lower, bits),
        };
        Ok(())
    }

    fn decode(raw: W::Half) -> S::Half<W> {
        <S::Half<W> as Int>::from_i128(Self::half_field().decode(raw.to_bits()))
    }
}

impl<W: Word, S: Signedness> From<W> for SplitRegister<W, S> {
    fn from(value: W) -> Self {
        Self::with_value(value)
    }
}

impl<W: Word, S: Signedness> fmt::Debug for SplitRegister<W, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (high, low) = self.halves();
        f.debug_struct("SplitRegister")
            .field("width", &W::BITS)
            .field("signed", &S::SIGNED)
            .field("value", &format_args!("{:#x}", self.value))
            .field("high", &high)
            .field("low", &low)
            .finish()
    }
}

impl<W: Word, S: Signedness> fmt::Display for SplitRegister<W, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let digits = (W::BITS / 4) as usize;
        write!(f, "{:#0width$x}", self.value, width = digits + 2)
    }
}
