#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voltage_upperlink::{Address, Command, MAX_WRITE_WORDS};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    address: &'a str,
    count: u16,
    values: Vec<u16>,
}

fuzz_target!(|input: Input| {
    let Ok(address) = Address::parse(input.address) else {
        return;
    };

    if let Ok(command) = Command::read(&address, usize::from(input.count)) {
        let wire = command.to_wire();
        assert!(!wire.contains('\r'));
        assert!(wire.starts_with("RD"));
    }

    match Command::write(&address, &input.values) {
        Ok(command) => {
            assert!(command.is_write());
            assert!(!command.to_wire().contains('\r'));
        }
        Err(_) => assert!(input.values.is_empty() || input.values.len() > MAX_WRITE_WORDS),
    }
});
