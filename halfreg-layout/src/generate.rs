use std::fmt::Write;
use crate::{Field, LayoutError, Register, RegisterFamily};

/// `BC` -> `Bc`, `status reg` -> `StatusReg`.
fn type_name(name: &str) -> String {
    let mut out = String::new();
    for part in name.split(|c: char| !c.is_ascii_alphanumeric()).filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars.map(|c| c.to_ascii_lowercase()));
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'R');
    }
    out
}

fn method_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

impl Field {
    /// Source text of a `get_<field>` method over a `raw: u<size>` value.
    pub fn create_get_method(&self, size: u8) -> Result<String, LayoutError> {
        let field = self.bit_field(size)?;
        let name = method_name(&self.name);
        let mask = field.mask();
        let lsb = field.lsb();
        Ok(if self.is_negative() {
            // Shift the field up against the sign bit, then back down arithmetically.
            let spare = u32::from(size) - field.width();
            format!(
                "    pub fn get_{name}(&self) -> i{size} {{\n\
                 \x20       (((self.raw >> {lsb}) & {mask:#x}) as i{size}) << {spare} >> {spare}\n\
                 \x20   }}\n"
            )
        } else {
            format!(
                "    pub fn get_{name}(&self) -> u{size} {{\n\
                 \x20       (self.raw >> {lsb}) & {mask:#x}\n\
                 \x20   }}\n"
            )
        })
    }

    /// Source text of a `set_<field>` method. The generated method leaves
    /// `raw` untouched when the value is out of range.
    pub fn create_set_method(&self, size: u8) -> Result<String, LayoutError> {
        let field = self.bit_field(size)?;
        let name = method_name(&self.name);
        let mask = field.mask();
        let lsb = field.lsb();
        let (min, max) = (*field.range().start(), *field.range().end());
        let full_width = field.width() == u32::from(size);
        let (operand, check) = if self.is_negative() {
            let check = format!("value < {min} || value > {max}");
            (format!("i{size}"), check)
        } else {
            (format!("u{size}"), format!("value > {max:#x}"))
        };
        let mut out = format!(
            "    pub fn set_{name}(&mut self, value: {operand}) -> Result<(), halfreg::RangeViolation> {{\n"
        );
        if !full_width {
            out.push_str(&format!(
                "        if {check} {{\n\
                 \x20           return Err(halfreg::RangeViolation {{ value: i128::from(value), min: {min}, max: {max} }});\n\
                 \x20       }}\n"
            ));
        }
        out.push_str(&format!(
            "        let bits = (value as u{size}) & {mask:#x};\n\
             \x20       self.raw = (self.raw & !({mask:#x} << {lsb})) | (bits << {lsb});\n\
             \x20       Ok(())\n\
             \x20   }}\n"
        ));
        Ok(out)
    }
}

impl Register {
    /// Source text of a struct wrapping the raw value, with one getter per
    /// readable field and one setter per writable field.
    pub fn generate_accessors(&self) -> Result<String, LayoutError> {
        self.is_valid()?;
        let mut out = String::new();
        let ty = type_name(&self.name);
        // Writing to a String never fails.
        let _ = writeln!(out, "/// {} ({}-bit register)", self.name, self.size);
        let _ = writeln!(out, "#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]");
        let _ = writeln!(out, "pub struct {} {{\n    pub raw: u{},\n}}\n", ty, self.size);
        let _ = writeln!(out, "impl {} {{", ty);
        for field in &self.fields {
            if field.read {
                out.push_str(&field.create_get_method(self.size)?);
            }
            if field.write {
                out.push_str(&field.create_set_method(self.size)?);
            }
        }
        out.push_str("}\n");
        Ok(out)
    }
}

impl RegisterFamily {
    /// Source text for every register of the family, in declaration order.
    pub fn generate(&self) -> Result<String, LayoutError> {
        let mut out = format!("// Register family {}\n", self.register_family);
        for register in &self.registers {
            debug!("Generating accessors for {}", register.name);
            out.push('\n');
            out.push_str(&register.generate_accessors()?);
        }
        Ok(out)
    }
}

#[test]
fn test_names() {
    assert_eq!(type_name("BC"), "Bc");
    assert_eq!(type_name("status reg"), "StatusReg");
    assert_eq!(type_name("8bit"), "R8bit");
    assert_eq!(method_name("Carry-Flag"), "carry_flag");
}

#[test]
fn test_signed_nibble_methods() {
    let field = Field::new("low", 0, 3, true);
    assert_eq!(
        field.create_get_method(8).unwrap(),
        "    pub fn get_low(&self) -> i8 {\n        (((self.raw >> 0) & 0xf) as i8) << 4 >> 4\n    }\n"
    );
    let set = field.create_set_method(8).unwrap();
    assert!(set.contains("pub fn set_low(&mut self, value: i8)"));
    assert!(set.contains("if value < -8 || value > 7 {"));
    assert!(set.contains("min: -8, max: 7"));
}

#[test]
fn test_full_width_setter_has_no_check() {
    let field = Field::new("all", 0, 15, false);
    let set = field.create_set_method(16).unwrap();
    assert!(!set.contains("return Err"));
    assert!(set.contains("let bits = (value as u16) & 0xffff;"));
}
