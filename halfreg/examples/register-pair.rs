extern crate halfreg;
extern crate rand;

use byteorder::LittleEndian as LE;
use halfreg::{HighLow16, NegHighLow16};
use rand::Rng;

// Walks a BC-style register pair through a few byte-sized loads and prints
// both views after each step.
fn main() {
    let mut rng = rand::rng();
    let mut bc = HighLow16::new();
    for _ in 0..4 {
        let b: u8 = rng.random();
        let c: u8 = rng.random();
        bc.set_high(u16::from(b)).unwrap();
        bc.set_low(u16::from(c)).unwrap();
        println!("BC = {} (B = {:#04x}, C = {:#04x})", bc, bc.get_high(), bc.get_low());
    }
    if let Err(e) = bc.set_low(0x100) {
        println!("Refused to load C: {}", e);
    }

    let mut memory = Vec::new();
    bc.write::<LE, _>(&mut memory).unwrap();
    let displacement = NegHighLow16::read::<LE, _>(&mut &memory[..]).unwrap();
    println!(
        "Same bytes as signed halves: high = {}, low = {}",
        displacement.get_high(),
        displacement.get_low()
    );
}
