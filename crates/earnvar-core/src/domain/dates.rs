use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

/// Day on which a company reported earnings.
pub type ReportDate = Date;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses upstream `M/D/YYYY` dates; zero padding is optional.
pub fn parse_us_date(input: &str) -> Result<Date, ValidationError> {
    let format = format_description!("[month padding:none]/[day padding:none]/[year]");
    Date::parse(input.trim(), &format).map_err(|_| ValidationError::InvalidDate {
        value: input.to_string(),
        expected: "MM/DD/YYYY",
    })
}

pub fn parse_iso_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), ISO_DATE).map_err(|_| ValidationError::InvalidDate {
        value: input.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// `YYYY-MM-DD`, as the upstream query parameters expect.
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}
