use std::io::prelude::*;
use std::io;
use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};
use crate::{SplitRegister, Signedness, Word};

/// A word that can be loaded from and stored to a byte stream.
pub trait WordRw: Sized {
    fn read_word<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self>;
    fn write_word<B: ByteOrder, W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

impl WordRw for u8 {
    fn read_word<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u8()
    }
    fn write_word<B: ByteOrder, W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(*self)
    }
}

macro_rules! word_rw_impl {
    ($($t:ty => $read:ident, $write:ident;)*) => {
        $(
            impl WordRw for $t {
                fn read_word<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self> {
                    reader.$read::<B>()
                }
                fn write_word<B: ByteOrder, W: Write>(&self, writer: &mut W) -> io::Result<()> {
                    writer.$write::<B>(*self)
                }
            }
        )*
    };
}

word_rw_impl! {
    u16 => read_u16, write_u16;
    u32 => read_u32, write_u32;
    u64 => read_u64, write_u64;
}

impl<W: Word, S: Signedness> SplitRegister<W, S> {
    /// Loads a whole register value of `WIDTH / 8` bytes.
    ///
    /// Like `set_register_value`, the loaded value is not checked.
    pub fn read<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self> {
        let value = W::read_word::<B, R>(reader)?;
        debug!("Loaded {}-bit register value {:#x}", W::BITS, value);
        Ok(Self::with_value(value))
    }
    /// Stores the whole register value as `WIDTH / 8` bytes.
    pub fn write<B: ByteOrder, Wr: Write>(&self, writer: &mut Wr) -> io::Result<()> {
        let value = self.get_register_value();
        debug!("Storing {}-bit register value {:#x}", W::BITS, value);
        value.write_word::<B, Wr>(writer)
    }
    /// Reloads the value in place. On error the register keeps its old value.
    pub fn load<B: ByteOrder, R: Read>(&mut self, reader: &mut R) -> io::Result<()> {
        let value = W::read_word::<B, R>(reader)?;
        self.set_register_value(value);
        Ok(())
    }
}

#[test]
fn test_round_trip_byte_orders() {
    use byteorder::{BigEndian as BE, LittleEndian as LE};
    let reg = crate::HighLow32::with_value(0x1234_5678);
    let mut le = Vec::new();
    reg.write::<LE, _>(&mut le).unwrap();
    assert_eq!(le, [0x78, 0x56, 0x34, 0x12]);
    let mut be = Vec::new();
    reg.write::<BE, _>(&mut be).unwrap();
    assert_eq!(be, [0x12, 0x34, 0x56, 0x78]);
    let back = crate::HighLow32::read::<BE, _>(&mut &be[..]).unwrap();
    assert_eq!(back.halves(), (0x1234, 0x5678));
}

#[test]
fn test_short_read_keeps_value() {
    use byteorder::LittleEndian as LE;
    let mut reg = crate::NegHighLow16::with_value(0xBEEF);
    let short = [0x01u8];
    assert!(reg.load::<LE, _>(&mut &short[..]).is_err());
    assert_eq!(reg.get_register_value(), 0xBEEF);
}
