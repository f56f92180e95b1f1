//! Named bit-field layouts for families of registers, stored as JSON.
//!
//! A family groups registers that share a naming scheme. Each register has a
//! width of 8, 16, 32 or 64 bits and a list of fields, each field being an
//! inclusive `lsb..=msb` bit range with read/write permissions and an
//! optional two's-complement interpretation.

#[macro_use]
extern crate log;
extern crate halfreg;

use halfreg::{BitField, RangeViolation};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::fmt;

mod generate;

/// Register widths a layout may use.
pub const SUPPORTED_WIDTHS: [u8; 4] = [8, 16, 32, 64];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub lsb: u8,
    pub msb: u8,
    pub read: bool,
    pub write: bool,
    pub negative: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub size: u8,
    pub fields: Vec<Field>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterFamily {
    pub register_family: String,
    pub register_family_widths: Vec<u8>,
    pub registers: Vec<Register>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    EmptyName,
    UnsupportedWidth(u8),
    FieldOutOfBounds { field: String, lsb: u8, msb: u8, size: u8 },
    DuplicateName(String),
    UnknownField(String),
    NotReadable(String),
    NotWritable(String),
    Range { field: String, source: RangeViolation },
    InvalidNumber(String),
    ValueTooWide { value: u64, size: u8 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LayoutError::EmptyName => f.write_str("No name provided"),
            LayoutError::UnsupportedWidth(size) => write!(
                f,
                "Unsupported register width {}. Supported widths are: 8, 16, 32, 64",
                size
            ),
            LayoutError::FieldOutOfBounds {
                ref field,
                lsb,
                msb,
                size,
            } => write!(
                f,
                "Field {} spans bits {}..={}, which does not fit a {}-bit register",
                field, lsb, msb, size
            ),
            LayoutError::DuplicateName(ref name) => write!(f, "Duplicate name: {}", name),
            LayoutError::UnknownField(ref name) => write!(f, "No field named {}", name),
            LayoutError::NotReadable(ref name) => write!(f, "Field {} is not readable", name),
            LayoutError::NotWritable(ref name) => write!(f, "Field {} is not writable", name),
            LayoutError::Range {
                ref field,
                ref source,
            } => write!(f, "Field {}: {}", field, source),
            LayoutError::InvalidNumber(ref text) => write!(f, "`{}` isn't a number", text),
            LayoutError::ValueTooWide { value, size } => {
                write!(f, "{:#x} does not fit a {}-bit register", value, size)
            }
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            LayoutError::Range { ref source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Field {
    pub fn new(name: &str, lsb: u8, msb: u8, negative: bool) -> Self {
        Field {
            name: name.to_string(),
            lsb,
            msb,
            read: true,
            write: true,
            negative: Some(negative),
        }
    }
    pub fn is_negative(&self) -> bool {
        self.negative.unwrap_or(false)
    }
    /// Bit-level view of the field. Fails if the bit range is reversed or
    /// does not fit a register of `size` bits.
    pub fn bit_field(&self, size: u8) -> Result<BitField, LayoutError> {
        let out_of_bounds = || LayoutError::FieldOutOfBounds {
            field: self.name.clone(),
            lsb: self.lsb,
            msb: self.msb,
            size,
        };
        if self.lsb > self.msb || self.msb >= size {
            return Err(out_of_bounds());
        }
        let width = u32::from(self.msb - self.lsb) + 1;
        BitField::new(u32::from(self.lsb), width, self.is_negative()).ok_or_else(out_of_bounds)
    }
    /// Reads the field out of a raw register value of `size` bits.
    pub fn get(&self, raw: u64, size: u8) -> Result<i128, LayoutError> {
        if !self.read {
            return Err(LayoutError::NotReadable(self.name.clone()));
        }
        Ok(self.bit_field(size)?.extract(raw))
    }
    /// Writes `value` into the field. `raw` is only modified on success.
    pub fn set(&self, raw: &mut u64, size: u8, value: i128) -> Result<(), LayoutError> {
        if !self.write {
            return Err(LayoutError::NotWritable(self.name.clone()));
        }
        let field = self.bit_field(size)?;
        *raw = field.insert(*raw, value).map_err(|source| {
            debug!("Rejected write of {} to field {}", value, self.name);
            LayoutError::Range {
                field: self.name.clone(),
                source,
            }
        })?;
        Ok(())
    }
}

impl Register {
    pub fn new(name: &str, size: u8) -> Self {
        Register {
            name: name.to_string(),
            size,
            fields: Vec::new(),
        }
    }
    /// A register with a `high` and a `low` field covering one half each.
    pub fn split_pair(name: &str, size: u8, negative: bool) -> Self {
        let half = size / 2;
        let mut register = Register::new(name, size);
        register.fields.push(Field::new("high", half, size.saturating_sub(1), negative));
        register.fields.push(Field::new("low", 0, half.saturating_sub(1), negative));
        register
    }
    pub fn is_valid(&self) -> Result<(), LayoutError> {
        if self.name.is_empty() {
            return Err(LayoutError::EmptyName);
        }
        if !SUPPORTED_WIDTHS.contains(&self.size) {
            return Err(LayoutError::UnsupportedWidth(self.size));
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(LayoutError::EmptyName);
            }
            field.bit_field(self.size)?;
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(LayoutError::DuplicateName(field.name.clone()));
            }
        }
        Ok(())
    }
    /// Appends `field` if the register stays valid with it.
    pub fn add_field(&mut self, field: Field) -> Result<(), LayoutError> {
        self.fields.push(field);
        if let Err(e) = self.is_valid() {
            self.fields.pop();
            return Err(e);
        }
        Ok(())
    }
    pub fn field(&self, name: &str) -> Result<&Field, LayoutError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| LayoutError::UnknownField(name.to_string()))
    }
    pub fn get_field(&self, raw: u64, name: &str) -> Result<i128, LayoutError> {
        self.field(name)?.get(raw, self.size)
    }
    pub fn set_field(&self, raw: &mut u64, name: &str, value: i128) -> Result<(), LayoutError> {
        self.field(name)?.set(raw, self.size, value)
    }
    /// Parses a raw value for this register, hexadecimal with a `0x` prefix
    /// or decimal. Values with bits at or above `size` are rejected.
    pub fn parse_raw(&self, text: &str) -> Result<u64, LayoutError> {
        let text = text.trim();
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
            None => text.replace('_', "").parse(),
        };
        let value = parsed.map_err(|_| LayoutError::InvalidNumber(text.to_string()))?;
        if u128::from(value) >> self.size != 0 {
            return Err(LayoutError::ValueTooWide {
                value,
                size: self.size,
            });
        }
        Ok(value)
    }
}

impl RegisterFamily {
    /// An empty family with no registers.
    pub fn new(name: &str) -> Self {
        RegisterFamily {
            register_family: name.to_string(),
            register_family_widths: Vec::new(),
            registers: Vec::new(),
        }
    }
    /// Parses and validates a family. Widths used by registers but missing
    /// from `register_family_widths` are added, as `add_register` would.
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let mut family: RegisterFamily = serde_json::from_str(json)?;
        for (i, register) in family.registers.iter().enumerate() {
            register.is_valid()?;
            if family.registers[..i].iter().any(|r| r.name == register.name) {
                return Err(LayoutError::DuplicateName(register.name.clone()).into());
            }
            if !family.register_family_widths.contains(&register.size) {
                warn!(
                    "Register {} is {}-bit, which family {} does not list",
                    register.name, register.size, family.register_family
                );
                family.register_family_widths.push(register.size);
            }
        }
        debug!(
            "Loaded register family {} with {} registers",
            family.register_family,
            family.registers.len()
        );
        Ok(family)
    }
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        RegisterFamily::from_json(&json)
    }
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let json = self.to_json_pretty()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
    pub fn add_register(&mut self, register: Register) -> Result<(), LayoutError> {
        register.is_valid()?;
        if self.register(&register.name).is_some() {
            return Err(LayoutError::DuplicateName(register.name));
        }
        if !self.register_family_widths.contains(&register.size) {
            self.register_family_widths.push(register.size);
        }
        debug!(
            "Adding {}-bit register {} to family {}",
            register.size, register.name, self.register_family
        );
        self.registers.push(register);
        Ok(())
    }
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name == name)
    }
}

#[test]
fn test_split_pair_layout() {
    let register = Register::split_pair("BC", 16, false);
    assert!(register.is_valid().is_ok());
    let mut raw = 0;
    register.set_field(&mut raw, "high", 0x12).unwrap();
    register.set_field(&mut raw, "low", 0x34).unwrap();
    assert_eq!(raw, 0x1234);
    assert_eq!(register.get_field(raw, "high"), Ok(0x12));
}

#[test]
fn test_field_permissions() {
    let mut register = Register::new("STATUS", 8);
    let mut field = Field::new("mode", 0, 2, false);
    field.write = false;
    register.add_field(field).unwrap();
    let mut raw = 0b101;
    assert_eq!(
        register.set_field(&mut raw, "mode", 1),
        Err(LayoutError::NotWritable("mode".to_string()))
    );
    assert_eq!(raw, 0b101);
    assert_eq!(register.get_field(raw, "mode"), Ok(5));
}
