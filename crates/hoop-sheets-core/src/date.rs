//! Spreadsheet serial dates
//!
//! Dates are stored as day counts from an epoch that depends on the
//! workbook's date system; the fractional part is the time of day.

use chrono::{Days, NaiveDate};

/// Convert a serial number to a calendar date, dropping the time of day
///
/// In the 1900 system serial 1 is 1900-01-01 counted from 1899-12-30, so
/// serials before March 1900 come out one day early, as in other tools
/// that ignore the phantom 1900-02-29. Returns `None` for negative,
/// non-finite or out-of-range serials.
pub fn serial_to_date(serial: f64, date_1904: bool) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = if date_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let days = serial.floor();
    if days > u32::MAX as f64 {
        return None;
    }
    epoch.checked_add_days(Days::new(days as u64))
}

/// Convert a calendar date to its serial number
pub fn date_to_serial(date: NaiveDate, date_1904: bool) -> f64 {
    let epoch = if date_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    };
    epoch.map_or(0.0, |epoch| (date - epoch).num_days() as f64)
}
