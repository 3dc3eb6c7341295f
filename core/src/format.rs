use chrono::{Datelike, NaiveDate};

use crate::model::Cents;

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Rupiah with no minor units and `.` as the thousands separator, e.g.
/// `Rp1.250.000`. Cents are rounded half away from zero.
pub fn format_currency(amount: Cents) -> String {
    let rupiah = (amount.unsigned_abs() + 50) / 100;
    let digits = rupiah.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 && rupiah > 0 {
        format!("-Rp{grouped}")
    } else {
        format!("Rp{grouped}")
    }
}

/// Long Indonesian date such as `17 Agustus 2024`, or `-` when absent.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!(
            "{} {} {}",
            date.day(),
            MONTHS_ID[date.month0() as usize],
            date.year()
        ),
        None => "-".to_string(),
    }
}
