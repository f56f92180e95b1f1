use std::error::Error;
use std::fmt;
use std::ops::RangeInclusive;

/// A write whose value does not fit the destination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeViolation {
    pub value: i128,
    pub min: i128,
    pub max: i128,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "value {} is outside of the field range {}..={}",
            self.value, self.min, self.max
        )
    }
}

impl Error for RangeViolation {}

/// A contiguous run of bits inside a 64-bit raw word.
///
/// Signed fields hold a two's-complement pattern of exactly `width` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub(crate) lsb: u32,
    pub(crate) width: u32,
    pub(crate) signed: bool,
}

impl BitField {
    /// Returns `None` if the field is empty or reaches past bit 63.
    pub const fn new(lsb: u32, width: u32, signed: bool) -> Option<Self> {
        if width == 0 || width > 64 || lsb >= 64 || lsb + width > 64 {
            return None;
        }
        Some(BitField { lsb, width, signed })
    }
    pub fn lsb(&self) -> u32 {
        self.lsb
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn is_signed(&self) -> bool {
        self.signed
    }
    /// Unshifted mask covering the field.
    pub fn mask(&self) -> u64 {
        u64::MAX >> (64 - self.width)
    }
    /// The values `encode` accepts.
    pub fn range(&self) -> RangeInclusive<i128> {
        if self.signed {
            let half = 1i128 << (self.width - 1);
            -half..=half - 1
        } else {
            0..=(1i128 << self.width) - 1
        }
    }
    /// Interprets an unshifted bit pattern. Bits above the field are ignored.
    pub fn decode(&self, bits: u64) -> i128 {
        let raw = i128::from(bits & self.mask());
        if self.signed && raw & (1 << (self.width - 1)) != 0 {
            raw - (1 << self.width)
        } else {
            raw
        }
    }
    /// Produces the unshifted bit pattern of `value`.
    pub fn encode(&self, value: i128) -> Result<u64, RangeViolation> {
        let range = self.range();
        if !range.contains(&value) {
            return Err(RangeViolation {
                value,
                min: *range.start(),
                max: *range.end(),
            });
        }
        // Masking an i128 keeps the low two's-complement bits of negative values.
        Ok((value & i128::from(self.mask())) as u64)
    }
    pub fn extract(&self, raw: u64) -> i128 {
        self.decode(raw >> self.lsb)
    }
    /// Returns `raw` with the field replaced by `value`. `raw` itself is never touched.
    pub fn insert(&self, raw: u64, value: i128) -> Result<u64, RangeViolation> {
        let bits = self.encode(value)?;
        let mask = self.mask() << self.lsb;
        Ok((raw & !mask) | (bits << self.lsb))
    }
}

#[test]
fn test_field_bounds() {
    assert!(BitField::new(0, 0, false).is_none());
    assert!(BitField::new(60, 5, false).is_none());
    assert!(BitField::new(64, 1, false).is_none());
    assert!(BitField::new(0, 64, true).is_some());
    assert!(BitField::new(63, 1, false).is_some());
}

#[test]
fn test_nibble_ranges() {
    let unsigned = BitField::new(0, 4, false).unwrap();
    let signed = BitField::new(0, 4, true).unwrap();
    assert_eq!(unsigned.range(), 0..=15);
    assert_eq!(signed.range(), -8..=7);
    assert_eq!(signed.encode(-8), Ok(0b1000));
    assert_eq!(signed.decode(0b1000), -8);
    assert_eq!(signed.decode(0b0111), 7);
    assert_eq!(
        signed.encode(-9),
        Err(RangeViolation {
            value: -9,
            min: -8,
            max: 7
        })
    );
    assert!(unsigned.encode(16).is_err());
    assert!(unsigned.encode(-1).is_err());
}

#[test]
fn test_full_width_field() {
    let field = BitField::new(0, 64, true).unwrap();
    assert_eq!(field.mask(), u64::MAX);
    assert_eq!(field.extract(u64::MAX), -1);
    assert_eq!(field.insert(0, i128::from(i64::MIN)), Ok(1 << 63));
    let field = BitField::new(0, 64, false).unwrap();
    assert_eq!(field.extract(u64::MAX), i128::from(u64::MAX));
}

#[test]
fn test_insert_keeps_neighbours() {
    let field = BitField::new(4, 8, false).unwrap();
    assert_eq!(field.insert(0xF00F, 0xAB), Ok(0xFABF));
    assert!(field.insert(0xF00F, 0x100).is_err());
    assert_eq!(field.extract(0xFABF), 0xAB);
}
