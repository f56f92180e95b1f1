extern crate halfreg_layout;

use halfreg_layout::{Register, RegisterFamily};
use std::error::Error;
use std::process;

const USAGE: &str = "Usage:
  regfields bootstrap <family.json> <family name>
  regfields add-register <family.json> <name> <size> [split|split-signed]
  regfields generate <family.json>
  regfields decode <family.json> <register> <value>";

fn bootstrap(path: &str, name: &str) -> Result<(), Box<dyn Error>> {
    RegisterFamily::new(name).save_to_file(path)
}

fn add_register(path: &str, name: &str, size: &str, kind: Option<&str>) -> Result<(), Box<dyn Error>> {
    let size: u8 = size.parse().map_err(|_| format!("`{}` isn't a number", size))?;
    let register = match kind {
        None => Register::new(name, size),
        Some("split") => Register::split_pair(name, size, false),
        Some("split-signed") => Register::split_pair(name, size, true),
        Some(other) => return Err(format!("Unknown register kind: {}", other).into()),
    };
    let mut family = RegisterFamily::load_from_file(path)?;
    family.add_register(register)?;
    family.save_to_file(path)
}

fn generate(path: &str) -> Result<(), Box<dyn Error>> {
    let family = RegisterFamily::load_from_file(path)?;
    print!("{}", family.generate()?);
    Ok(())
}

fn decode(path: &str, name: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let family = RegisterFamily::load_from_file(path)?;
    let register = family
        .register(name)
        .ok_or_else(|| format!("No register named {} in family {}", name, family.register_family))?;
    let raw = register.parse_raw(value)?;
    println!("{} ({}-bit) = {:#x}", register.name, register.size, raw);
    for field in register.fields.iter().filter(|f| f.read) {
        match field.get(raw, register.size) {
            Ok(v) => println!("  {:<12} [{:>2}..={:<2}] {}", field.name, field.lsb, field.msb, v),
            Err(e) => println!("  {:<12} {}", field.name, e),
        }
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match args[..] {
        ["bootstrap", path, name] => bootstrap(path, name),
        ["add-register", path, name, size] => add_register(path, name, size, None),
        ["add-register", path, name, size, kind] => add_register(path, name, size, Some(kind)),
        ["generate", path] => generate(path),
        ["decode", path, name, value] => decode(path, name, value),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}
