extern crate env_logger;
extern crate halfreg;
extern crate halfreg_layout;

use halfreg::{Half, HighLow16, NegHighLow8};
use halfreg_layout::{Field, LayoutError, Register, RegisterFamily};

const FAMILY_JSON: &str = r#"{
  "register_family": "z80",
  "register_family_widths": [16],
  "registers": [
    {
      "name": "BC",
      "size": 16,
      "fields": [
        { "name": "high", "lsb": 8, "msb": 15, "read": true, "write": true, "negative": false },
        { "name": "low", "lsb": 0, "msb": 7, "read": true, "write": true, "negative": null }
      ]
    }
  ]
}"#;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn load_and_decode() {
    init();
    let family = RegisterFamily::from_json(FAMILY_JSON).unwrap();
    assert_eq!(family.register_family, "z80");
    let bc = family.register("BC").unwrap();
    assert_eq!(bc.get_field(0xBEEF, "high"), Ok(0xBE));
    assert_eq!(bc.get_field(0xBEEF, "low"), Ok(0xEF));
    assert_eq!(
        bc.get_field(0xBEEF, "carry"),
        Err(LayoutError::UnknownField("carry".to_string()))
    );
}

#[test]
fn json_round_trip_keeps_format() {
    init();
    let family = RegisterFamily::from_json(FAMILY_JSON).unwrap();
    let json = family.to_json_pretty().unwrap();
    assert!(json.contains("\"register_family_widths\""));
    assert_eq!(RegisterFamily::from_json(&json).unwrap(), family);
}

#[test]
fn invalid_register_rejected_on_load() {
    init();
    let json = FAMILY_JSON.replace("\"msb\": 15", "\"msb\": 16");
    assert!(RegisterFamily::from_json(&json).is_err());
    let json = FAMILY_JSON.replace("\"size\": 16", "\"size\": 12");
    assert!(RegisterFamily::from_json(&json).is_err());
}

#[test]
fn add_register_tracks_widths() {
    init();
    let mut family = RegisterFamily::new("toy");
    family.add_register(Register::split_pair("AF", 16, false)).unwrap();
    family.add_register(Register::split_pair("IX", 16, true)).unwrap();
    family.add_register(Register::split_pair("D", 64, false)).unwrap();
    assert_eq!(family.register_family_widths, vec![16, 64]);
    assert_eq!(
        family.add_register(Register::new("AF", 8)),
        Err(LayoutError::DuplicateName("AF".to_string()))
    );
    assert_eq!(
        family.add_register(Register::new("Q", 24)),
        Err(LayoutError::UnsupportedWidth(24))
    );
    assert_eq!(family.add_register(Register::new("", 8)), Err(LayoutError::EmptyName));
    assert_eq!(family.registers.len(), 3);
}

#[test]
fn add_field_validation() {
    let mut register = Register::new("FLAGS", 8);
    register.add_field(Field::new("carry", 0, 0, false)).unwrap();
    assert_eq!(
        register.add_field(Field::new("carry", 1, 1, false)),
        Err(LayoutError::DuplicateName("carry".to_string()))
    );
    assert!(matches!(
        register.add_field(Field::new("reversed", 4, 2, false)),
        Err(LayoutError::FieldOutOfBounds { .. })
    ));
    assert!(matches!(
        register.add_field(Field::new("wide", 4, 8, false)),
        Err(LayoutError::FieldOutOfBounds { .. })
    ));
    assert_eq!(register.fields.len(), 1);
}

#[test]
fn split_pair_matches_split_register() {
    init();
    let layout = Register::split_pair("BC", 16, false);
    let mut reg = HighLow16::new();
    let mut raw = 0u64;
    for (half, value) in [(Half::High, 0xAB), (Half::Low, 0xCD)] {
        reg.set_half(half, value).unwrap();
        layout.set_field(&mut raw, &half.to_string(), i128::from(value)).unwrap();
    }
    assert_eq!(raw, u64::from(reg.get_register_value()));

    let layout = Register::split_pair("N", 8, true);
    let reg = NegHighLow8::with_value(0x8F);
    assert_eq!(layout.get_field(0x8F, "high"), Ok(i128::from(reg.get_high())));
    assert_eq!(layout.get_field(0x8F, "low"), Ok(i128::from(reg.get_low())));
    assert_eq!(layout.get_field(0x8F, "high"), Ok(-8));
    assert_eq!(layout.get_field(0x8F, "low"), Ok(-1));
}

#[test]
fn rejected_field_write_is_atomic() {
    let layout = Register::split_pair("N", 8, true);
    let mut raw = 0x5A;
    let err = layout.set_field(&mut raw, "low", 8).unwrap_err();
    match err {
        LayoutError::Range { ref field, source } => {
            assert_eq!(field, "low");
            assert_eq!((source.min, source.max), (-8, 7));
        }
        other => panic!("Unexpected error: {}", other),
    }
    assert_eq!(raw, 0x5A);
}

#[test]
fn save_and_load_file() {
    init();
    let mut family = RegisterFamily::new("files");
    family.add_register(Register::split_pair("HL", 32, false)).unwrap();
    let path = std::env::temp_dir().join(format!("halfreg-layout-{}.json", std::process::id()));
    family.save_to_file(&path).unwrap();
    let loaded = RegisterFamily::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, family);
}

#[test]
fn duplicate_registers_rejected_on_load() {
    init();
    let json = r#"{
      "register_family": "dup",
      "register_family_widths": [8],
      "registers": [
        { "name": "BC", "size": 16, "fields": [] },
        { "name": "BC", "size": 32, "fields": [] }
      ]
    }"#;
    let err = RegisterFamily::from_json(json).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LayoutError>(),
        Some(&LayoutError::DuplicateName("BC".to_string()))
    );
}

#[test]
fn missing_widths_filled_on_load() {
    init();
    let json = FAMILY_JSON.replace("\"register_family_widths\": [16]", "\"register_family_widths\": [8]");
    let family = RegisterFamily::from_json(&json).unwrap();
    assert_eq!(family.register_family_widths, vec![8, 16]);
}

#[test]
fn parse_raw_values() {
    let bc = Register::split_pair("BC", 16, false);
    assert_eq!(bc.parse_raw("0xBEEF"), Ok(0xBEEF));
    assert_eq!(bc.parse_raw("0XFF_FF"), Ok(0xFFFF));
    assert_eq!(bc.parse_raw("4660"), Ok(0x1234));
    assert_eq!(
        bc.parse_raw("0x1FFFF"),
        Err(LayoutError::ValueTooWide {
            value: 0x1FFFF,
            size: 16
        })
    );
    assert_eq!(
        bc.parse_raw("0xBEEG"),
        Err(LayoutError::InvalidNumber("0xBEEG".to_string()))
    );
    assert!(bc.parse_raw("-1").is_err());
    let wide = Register::new("D", 64);
    assert_eq!(wide.parse_raw("0xFFFFFFFFFFFFFFFF"), Ok(u64::MAX));
}

#[test]
fn bootstrap_add_register_generate() {
    init();
    let path = std::env::temp_dir().join(format!("halfreg-layout-gen-{}.json", std::process::id()));
    RegisterFamily::new("gen").save_to_file(&path).unwrap();
    let mut family = RegisterFamily::load_from_file(&path).unwrap();
    assert!(family.registers.is_empty());
    family.add_register(Register::split_pair("BC", 16, false)).unwrap();
    family.add_register(Register::split_pair("disp", 8, true)).unwrap();
    family.save_to_file(&path).unwrap();
    let family = RegisterFamily::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let source = family.generate().unwrap();
    assert!(source.starts_with("// Register family gen\n"));
    assert!(source.contains("pub struct Bc {\n    pub raw: u16,\n}"));
    assert!(source.contains("pub fn get_high(&self) -> u16 {\n        (self.raw >> 8) & 0xff\n    }"));
    assert!(source.contains("pub fn set_low(&mut self, value: u16) -> Result<(), halfreg::RangeViolation>"));
    assert!(source.contains("if value > 0xff {"));
    assert!(source.contains("pub struct Disp {\n    pub raw: u8,\n}"));
    assert!(source.contains("pub fn get_high(&self) -> i8 {\n        (((self.raw >> 4) & 0xf) as i8) << 4 >> 4\n    }"));
}

#[test]
fn generate_skips_inaccessible_fields() {
    let mut register = Register::new("STATUS", 8);
    let mut mode = Field::new("mode", 0, 2, false);
    mode.write = false;
    let mut strobe = Field::new("strobe", 7, 7, false);
    strobe.read = false;
    register.add_field(mode).unwrap();
    register.add_field(strobe).unwrap();
    let source = register.generate_accessors().unwrap();
    assert!(source.contains("fn get_mode"));
    assert!(!source.contains("fn set_mode"));
    assert!(source.contains("fn set_strobe"));
    assert!(!source.contains("fn get_strobe"));
}
