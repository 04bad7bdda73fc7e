#![no_main]

use libfuzzer_sys::fuzz_target;
use voltage_upperlink::Address;

fuzz_target!(|text: &str| {
    if let Ok(address) = Address::parse(text) {
        // normalized text must parse back to the same address
        let again = Address::parse(&address.to_string()).expect("normalized address reparses");
        assert_eq!(again.base_address(), address.base_address());
        assert_eq!(again.suffix(), address.suffix());
    }
});
