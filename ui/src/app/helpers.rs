use chrono::{Datelike, Local, NaiveDate};
use iced::keyboard;
use iced::Color;

use dspi_core::{Cents, MAX_AMOUNT};

use crate::app::types::Message;

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn level_color(level: tracing::Level) -> Color {
    match level {
        tracing::Level::ERROR => Color::from_rgb8(0xe0, 0x4f, 0x4f),
        tracing::Level::WARN => Color::from_rgb8(0xe0, 0xb0, 0x4f),
        tracing::Level::INFO => Color::from_rgb8(0x3b, 0x82, 0xf6),
        tracing::Level::DEBUG => Color::from_rgb8(0x22, 0x7d, 0x64),
        tracing::Level::TRACE => Color::from_rgb8(0x6b, 0x72, 0x80),
    }
}

pub(crate) fn amount_color(amount: Cents) -> Color {
    if amount < 0 {
        Color::from_rgb8(0xc0, 0x39, 0x2b)
    } else {
        Color::from_rgb8(0x1f, 0x2a, 0x37)
    }
}

pub(crate) fn delete_key_event(
    key: keyboard::Key,
    _modifiers: keyboard::Modifiers,
) -> Option<Message> {
    match key {
        keyboard::Key::Named(keyboard::key::Named::Delete) => Some(Message::DeleteSelectedTravel),
        _ => None,
    }
}

pub(crate) fn current_year() -> i32 {
    Local::now().year()
}

pub(crate) fn parse_date_input(value: &str) -> Result<Option<NaiveDate>, ()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT)
        .map(Some)
        .map_err(|_| ())
}

pub(crate) fn format_date_input(date: NaiveDate) -> String {
    date.format(DATE_INPUT_FORMAT).to_string()
}

pub(crate) fn parse_count_input(value: &str) -> Result<Option<u32>, ()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<u32>().map(Some).map_err(|_| ())
}

/// Parses a rupiah amount into cents. Accepts an optional `Rp` prefix,
/// `.` thousands grouping and `,` as the decimal mark.
pub(crate) fn parse_amount_input(value: &str) -> Result<Option<Cents>, ()> {
    let trimmed = value.trim();
    let trimmed = trimmed
        .strip_prefix("Rp")
        .or_else(|| trimmed.strip_prefix("rp"))
        .unwrap_or(trimmed)
        .trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(trimmed) {
        trimmed.replace('.', "")
    } else {
        trimmed.to_string()
    };

    let parsed = normalized.parse::<f64>().map_err(|_| ())?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(());
    }
    let cents = (parsed * 100.0).round();
    if cents > MAX_AMOUNT as f64 {
        return Err(());
    }
    Ok(Some(cents as Cents))
}

fn is_thousands_grouped(value: &str) -> bool {
    let mut groups = value.split('.');
    let Some(first) = groups.next() else {
        return false;
    };
    let rest: Vec<&str> = groups.collect();
    !rest.is_empty()
        && !first.is_empty()
        && first.len() <= 3
        && rest
            .iter()
            .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()))
}

/// Inverse of [`parse_amount_input`] for prefilling edit forms.
pub(crate) fn format_amount_input(amount: Cents) -> String {
    let whole = amount / 100;
    let fraction = (amount % 100).abs();
    if fraction == 0 {
        whole.to_string()
    } else {
        format!("{whole},{fraction:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_input_accepts_rupiah_forms() {
        assert_eq!(parse_amount_input(""), Ok(None));
        assert_eq!(parse_amount_input("500000"), Ok(Some(50_000_000)));
        assert_eq!(parse_amount_input("Rp1.250.000"), Ok(Some(125_000_000)));
        assert_eq!(parse_amount_input("1.250.000,50"), Ok(Some(125_000_050)));
        assert_eq!(parse_amount_input("12.5"), Ok(Some(1_250)));
        assert_eq!(parse_amount_input("-5"), Err(()));
        assert_eq!(parse_amount_input("lima"), Err(()));
    }

    #[test]
    fn amount_input_rejects_amounts_beyond_the_cap() {
        assert_eq!(parse_amount_input("99999999999999999"), Err(()));
        assert_eq!(parse_amount_input("1e300"), Err(()));
        assert_eq!(
            parse_amount_input("Rp10.000.000.000.000"),
            Ok(Some(MAX_AMOUNT))
        );
    }

    #[test]
    fn amount_input_roundtrips_through_form_text() {
        for amount in [0, 50_000_000, 125_000_050] {
            let text = format_amount_input(amount);
            assert_eq!(parse_amount_input(&text), Ok(Some(amount)));
        }
    }

    #[test]
    fn date_and_count_inputs() {
        assert_eq!(
            parse_date_input(" 2024-08-17 "),
            Ok(NaiveDate::from_ymd_opt(2024, 8, 17))
        );
        assert_eq!(parse_date_input(""), Ok(None));
        assert_eq!(parse_date_input("2024-02-30"), Err(()));
        assert_eq!(parse_count_input("12"), Ok(Some(12)));
        assert_eq!(parse_count_input("-1"), Err(()));
    }

    #[test]
    fn delete_key_maps_to_travel_delete() {
        let message = delete_key_event(
            keyboard::Key::Named(keyboard::key::Named::Delete),
            keyboard::Modifiers::default(),
        );
        assert!(matches!(message, Some(Message::DeleteSelectedTravel)));
        assert!(
            delete_key_event(
                keyboard::Key::Named(keyboard::key::Named::Enter),
                keyboard::Modifiers::default()
            )
            .is_none()
        );
    }
}
