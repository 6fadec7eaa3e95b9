//! ABI layer for `localtime`.
//!
//! Zone selection, first match wins:
//! 1. a configured offset (`WASMLIBC_TZ_OFFSET` or `set_tz_offset_secs`),
//!    with `tm_isdst = 0`;
//! 2. on wasm32, the JavaScript host's zone at that instant (`Date`), with
//!    DST detected from the January and July offsets;
//! 3. UTC.

use std::cell::UnsafeCell;
use std::ffi::{c_char, c_int, c_long};
use std::ptr::null_mut;

use wasmlibc_core::errno::{EINVAL, EOVERFLOW};
use wasmlibc_core::time::{self, BrokenDownTime, MAX_OFFSET_SECS};
use wasmlibc_membrane::config;

use crate::errno_abi::set_errno;

#[allow(non_camel_case_types)]
pub type time_t = i64;

/// `struct tm` as laid out by musl and emscripten.
#[repr(C)]
#[allow(non_camel_case_types)]
#[derive(Debug)]
pub struct tm {
    pub tm_sec: c_int,
    pub tm_min: c_int,
    pub tm_hour: c_int,
    pub tm_mday: c_int,
    pub tm_mon: c_int,
    pub tm_year: c_int,
    pub tm_wday: c_int,
    pub tm_yday: c_int,
    pub tm_isdst: c_int,
    pub tm_gmtoff: c_long,
    pub tm_zone: *const c_char,
}

impl tm {
    const fn zeroed() -> Self {
        Self {
            tm_sec: 0,
            tm_min: 0,
            tm_hour: 0,
            tm_mday: 0,
            tm_mon: 0,
            tm_year: 0,
            tm_wday: 0,
            tm_yday: 0,
            tm_isdst: 0,
            tm_gmtoff: 0,
            tm_zone: std::ptr::null(),
        }
    }
}

thread_local! {
    static TM: UnsafeCell<tm> = const { UnsafeCell::new(tm::zeroed()) };
    static ZONE: UnsafeCell<[u8; 8]> = const { UnsafeCell::new([0; 8]) };
}

fn fill(out: &mut tm, src: &BrokenDownTime, zone: *const c_char) {
    out.tm_sec = src.tm_sec;
    out.tm_min = src.tm_min;
    out.tm_hour = src.tm_hour;
    out.tm_mday = src.tm_mday;
    out.tm_mon = src.tm_mon;
    out.tm_year = src.tm_year;
    out.tm_wday = src.tm_wday;
    out.tm_yday = src.tm_yday;
    out.tm_isdst = src.tm_isdst;
    // Offsets are clamped to ±18 h, which fits a 32-bit long.
    out.tm_gmtoff = src.tm_gmtoff as c_long;
    out.tm_zone = zone;
}

#[cfg(target_arch = "wasm32")]
mod host {
    use js_sys::Date;
    use wasm_bindgen::JsValue;

    use super::{MAX_OFFSET_SECS, time};

    /// `Date` reports minutes west of UTC.
    fn east_secs(minutes_west: f64) -> Option<i32> {
        let secs = -(minutes_west * 60.0);
        (secs.is_finite() && secs.abs() <= f64::from(MAX_OFFSET_SECS)).then_some(secs as i32)
    }

    /// Offset and DST flag of the host zone at `t`, or `None` when `t` is
    /// outside the range `Date` represents.
    pub(super) fn zone_at(t: i64) -> Option<(i32, bool)> {
        let date = Date::new(&JsValue::from_f64(t as f64 * 1000.0));
        let current = east_secs(date.get_timezone_offset())?;
        let year = date.get_full_year();
        let january = east_secs(Date::new_with_year_month_day(year, 0, 1).get_timezone_offset())?;
        let july = east_secs(Date::new_with_year_month_day(year, 6, 1).get_timezone_offset())?;
        Some((current, time::dst_in_effect(current, january, july)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod host {
    pub(super) fn zone_at(_t: i64) -> Option<(i32, bool)> {
        None
    }
}

/// Offset and DST flag `localtime` applies at `t`.
fn zone_for(t: time_t) -> (i32, bool) {
    if let Some(offset) = config::tz_offset_override() {
        return (offset, false);
    }
    host::zone_at(t).unwrap_or((0, false))
}

abi_fn! {
    /// The returned storage belongs to the calling thread and is overwritten
    /// by its next call.
    fn wasmlibc_localtime(timep: *const time_t) -> *mut tm {
        if timep.is_null() {
            set_errno(EINVAL);
            return null_mut();
        }
        let (offset, isdst) = zone_for(*timep);
        let Some(broken) = time::localtime_zoned(*timep, offset, isdst) else {
            set_errno(EOVERFLOW);
            return null_mut();
        };

        let zone = ZONE.with(|cell| {
            let slot = cell.get();
            *slot = time::zone_name(offset);
            slot.cast::<c_char>().cast_const()
        });
        TM.with(|cell| {
            let slot = cell.get();
            fill(&mut *slot, &broken, zone);
            slot
        })
    }
}
