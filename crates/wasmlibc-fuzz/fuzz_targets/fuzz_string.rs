#![no_main]
use libfuzzer_sys::fuzz_target;
use wasmlibc_core::string;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the search character, the rest splits into two strings.
    let c = data[0];
    let rest = &data[1..];
    let (l, r) = rest.split_at(rest.len() / 2);

    let len = string::strlen(l);
    assert!(len <= l.len());

    let cmp = string::strcmp(l, r);
    assert_eq!(cmp.signum(), -string::strcmp(r, l).signum());
    assert_eq!(string::strncmp(l, r, 0), 0);

    if let Some(i) = string::strchr(l, c) {
        assert!(i <= len);
        assert_eq!(l.get(i).copied().unwrap_or(0), c);
        assert!(string::strrchr(l, c).is_some_and(|j| j >= i));
    }

    let span = string::strspn(l, r);
    let cspan = string::strcspn(l, r);
    assert!(span <= len && cspan <= len);

    let mut dest = vec![0u8; len + string::strlen(r) + 1];
    string::strcpy(&mut dest, l);
    string::strcat(&mut dest, r);
    assert_eq!(string::strlen(&dest), len + string::strlen(r));
});
