#![no_main]

use libfuzzer_sys::fuzz_target;
use voltage_upperlink::command::{check_write_response, parse_read_response};

fuzz_target!(|input: (&str, u16)| {
    let (line, count) = input;
    let count = usize::from(count % 1001);

    if let Ok(Some(words)) = parse_read_response(Some(line), count) {
        assert!(words.len() <= count);
    }
    let _ = check_write_response(Some(line));
});
