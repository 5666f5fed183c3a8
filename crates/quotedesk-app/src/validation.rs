// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use time::macros::format_description;

pub const DATE_LAYOUT: &str = "YYYY-MM-DD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    InvalidNumber,
    NegativePrice,
    NonPositiveQuantity,
    InvalidDate,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber => f.write_str("invalid number"),
            Self::NegativePrice => f.write_str("negative price"),
            Self::NonPositiveQuantity => f.write_str("quantity must be positive"),
            Self::InvalidDate => f.write_str("invalid date value"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Parses a numeric field. Accepts surrounding whitespace, an optional leading
/// `$` and `,` group separators.
pub fn parse_number(input: &str) -> ValidationResult<f64> {
    let clean = input.trim().replace(',', "");
    let (sign, unsigned) = match clean.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, clean.as_str()),
    };
    let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);
    if unsigned.is_empty() || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(ValidationError::InvalidNumber);
    }

    let value = unsigned
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidNumber)?;
    if !value.is_finite() {
        return Err(ValidationError::InvalidNumber);
    }
    Ok(sign * value)
}

pub fn parse_quantity(input: &str) -> ValidationResult<f64> {
    let value = parse_number(input)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveQuantity);
    }
    Ok(value)
}

pub fn parse_price(input: &str) -> ValidationResult<f64> {
    let value = parse_number(input)?;
    if value < 0.0 {
        return Err(ValidationError::NegativePrice);
    }
    Ok(value)
}

pub fn parse_date(input: &str) -> ValidationResult<Date> {
    Date::parse(input.trim(), &format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate)
}

pub fn format_date(value: Date) -> String {
    value
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "1970-01-01".to_owned())
}

/// Formats an amount as US dollars, rounding to cents.
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "$-".to_owned();
    }
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", comma_format(cents / 100), cents % 100)
}

fn comma_format(value: u64) -> String {
    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}
