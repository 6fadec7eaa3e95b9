#![no_main]
use libfuzzer_sys::fuzz_target;
use wasmlibc_core::time::{MAX_OFFSET_SECS, localtime_fixed, zone_name};

fuzz_target!(|data: &[u8]| {
    let Some((epoch, rest)) = data.split_first_chunk::<8>() else {
        return;
    };
    let epoch = i64::from_le_bytes(*epoch);
    let offset = rest
        .first_chunk::<4>()
        .map_or(0, |raw| i32::from_le_bytes(*raw));

    let zone = zone_name(offset);
    assert!(zone.contains(&0));

    if let Some(tm) = localtime_fixed(epoch, offset) {
        assert!((0..=60).contains(&tm.tm_sec));
        assert!((0..=59).contains(&tm.tm_min));
        assert!((0..=23).contains(&tm.tm_hour));
        assert!((1..=31).contains(&tm.tm_mday));
        assert!((0..=11).contains(&tm.tm_mon));
        assert!((0..=6).contains(&tm.tm_wday));
        assert!((0..=365).contains(&tm.tm_yday));
        assert!(tm.tm_gmtoff.abs() <= i64::from(MAX_OFFSET_SECS));
    }
});
