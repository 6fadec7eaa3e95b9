#![no_main]
use libfuzzer_sys::fuzz_target;
use wasmlibc_core::stdio::{ArgClass, FormatArg, StrBound, arg_plan, parse_format_string, render};

fuzz_target!(|data: &[u8]| {
    let segments = parse_format_string(data);
    let Ok(plan) = arg_plan(&segments) else {
        return;
    };

    // A `*` string precision is an earlier int slot.
    for (i, class) in plan.iter().enumerate() {
        if let ArgClass::CStr(StrBound::Arg(slot)) = class {
            assert!(*slot < i);
            assert_eq!(plan[*slot], ArgClass::Int);
        }
    }

    // Feed each directive a well-typed value; %n gets a null pointer so no
    // count write is requested.
    let args: Vec<FormatArg<'_>> = plan
        .iter()
        .enumerate()
        .map(|(i, class)| match class {
            ArgClass::Double => FormatArg::Float(i as f64 * -1.25e3),
            ArgClass::Pointer => FormatArg::Pointer(0),
            ArgClass::CStr(_) => FormatArg::Str(Some(b"fuzz")),
            _ => FormatArg::Int((i as i64 % 64) - 32),
        })
        .collect();

    if let Ok(rendered) = render(&segments, &args) {
        assert!(rendered.counts.is_empty());
        assert!(!rendered.bytes.contains(&0) || data.contains(&b'c'));
    }
});
