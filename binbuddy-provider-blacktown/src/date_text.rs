//! Parsing of the human-readable "next service" text.

use chrono::{NaiveDate, ParseError};
use tracing::debug;

/// Trailing token form, e.g. `Tue 16/9/2025`.
const NUMERIC_FORMAT: &str = "%d/%m/%Y";
/// Long form, e.g. `Tuesday, 16 September 2025`.
const LONG_FORMAT: &str = "%d %B %Y";

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Why a next-service text did not yield a date.
pub enum DateTextError {
    /// The text was blank.
    #[error("no date token")]
    Empty,
    /// The trailing token was not a `day/month/year` date.
    #[error("invalid date token: {0}")]
    Invalid(#[from] ParseError),
    /// The year was not written with exactly four digits.
    #[error("year is not four digits")]
    Year,
}

/// Parse the collection date out of a next-service text.
///
/// The final whitespace-delimited token is read as `day/month/year`. When that
/// fails, the last three words are tried as `day Month year`; the council has
/// not been seen serving that form live, so its use is logged.
///
/// # Errors
///
/// Returns [`DateTextError`] when neither form matches, which is also the case
/// for placeholder texts such as "Same day as general waste".
pub fn parse_next_service(text: &str) -> Result<NaiveDate, DateTextError> {
    let Some(token) = text.split_whitespace().last() else {
        return Err(DateTextError::Empty);
    };

    match parse_numeric(token) {
        Ok(date) => Ok(date),
        Err(numeric_err) => match parse_long_form(text) {
            Some(date) => {
                debug!(text, %date, "Parsed next service date from long form");
                Ok(date)
            }
            None => Err(numeric_err),
        },
    }
}

fn parse_numeric(token: &str) -> Result<NaiveDate, DateTextError> {
    let date = NaiveDate::parse_from_str(token, NUMERIC_FORMAT)?;
    let year = token.rsplit('/').next().unwrap_or_default();
    if is_four_digit_year(year) {
        Ok(date)
    } else {
        Err(DateTextError::Year)
    }
}

fn parse_long_form(text: &str) -> Option<NaiveDate> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let [.., day, month, year] = words.as_slice() else {
        return None;
    };
    if !is_four_digit_year(year) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{day} {month} {year}"), LONG_FORMAT).ok()
}

// chrono's %Y takes any width and a sign; the council always writes four digits.
fn is_four_digit_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|byte| byte.is_ascii_digit())
}
