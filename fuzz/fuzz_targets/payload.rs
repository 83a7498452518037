#![no_main]

use libfuzzer_sys::fuzz_target;
use eventbuf::EventContainer;

fuzz_target!(|data: &[u8]| {
    let Ok(mut event) = EventContainer::from_bytes(data.to_vec()) else {
        return;
    };

    let names = event.names().map(<[String]>::to_vec).unwrap_or_default();
    for name in &names {
        let _ = event.get(name);
    }
    let _ = event.to_string();
    let _ = event.flush_cache();
});
