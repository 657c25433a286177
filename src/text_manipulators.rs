use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::{error::NormalizationFailure, game::Mode};

const OPENING_QUOTE: char = '“';
const CLOSING_QUOTE: char = '”';

// A single leading zero, unless it is the whole value.
static LEADING_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0(.+)$").expect("leading zero pattern is valid"));

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

pub fn remove_leading_zero(s: &str) -> String {
    LEADING_ZERO.replace(s, "${1}").into_owned()
}

/// Pulls the quoted username out of a "First “username” Last" display name.
pub fn format_username(display_name: &str) -> Result<String, NormalizationFailure> {
    display_name
        .split_whitespace()
        .rfind(|token| token.contains(OPENING_QUOTE))
        .map(|token| token.replace([OPENING_QUOTE, CLOSING_QUOTE], ""))
        .ok_or_else(|| NormalizationFailure::MalformedUsername(display_name.to_string()))
}

/// Turns the highlighted score/time text into a bare value.
pub fn format_value(raw: &str, mode: Mode) -> String {
    let raw = raw.trim();
    match mode {
        // Drop the two-character unit marker in front of times.
        Mode::Time => raw.chars().skip(2).collect(),
        Mode::Score => raw.replace(',', ""),
    }
}

/// Submission date split as (day, month, year) with leading zeros removed
/// from day and month.
pub fn split_date(raw: &str) -> Result<(String, String, String), NormalizationFailure> {
    let mut parts = raw.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(day))
            if !year.is_empty() && !month.is_empty() && !day.is_empty() =>
        {
            Ok((
                remove_leading_zero(day),
                remove_leading_zero(month),
                year.to_string(),
            ))
        }
        _ => Err(NormalizationFailure::MalformedDate(raw.to_string())),
    }
}

pub fn get_chart_url(base_url: &str, chart_id: u32) -> String {
    format!("{}/chart/{}", base_url.trim_end_matches('/'), chart_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_examples() {
        assert_eq!(remove_leading_zero("0"), "0");
        assert_eq!(remove_leading_zero("09"), "9");
        assert_eq!(remove_leading_zero("10"), "10");
        assert_eq!(remove_leading_zero("00"), "0");
        assert_eq!(remove_leading_zero(""), "");
    }

    #[test]
    fn leading_zero_is_idempotent() {
        for s in ["0", "01", "09", "10", "31", "00"] {
            let once = remove_leading_zero(s);
            assert_eq!(remove_leading_zero(&once), once);
        }
    }

    #[test]
    fn username_is_taken_from_quotes() {
        assert_eq!(format_username("John “Speedy” Doe").unwrap(), "Speedy");
        assert_eq!(format_username("“Solo”").unwrap(), "Solo");
    }

    #[test]
    fn last_quoted_token_wins() {
        assert_eq!(format_username("Al “old” “new” Bo").unwrap(), "new");
    }

    #[test]
    fn username_without_quotes_fails() {
        assert_eq!(
            format_username("John Doe"),
            Err(NormalizationFailure::MalformedUsername("John Doe".into()))
        );
    }

    #[test]
    fn time_values_drop_unit_marker() {
        assert_eq!(format_value("  ⏱ 57.33 ", Mode::Time), "57.33");
        assert_eq!(format_value("s 12.01", Mode::Time), "12.01");
    }

    #[test]
    fn score_values_drop_commas() {
        assert_eq!(format_value(" 1,234,560\n", Mode::Score), "1234560");
    }

    #[test]
    fn dates_are_decomposed() {
        assert_eq!(
            split_date("2021-03-09").unwrap(),
            ("9".into(), "3".into(), "2021".into())
        );
        assert_eq!(
            split_date("2019-12-10").unwrap(),
            ("10".into(), "12".into(), "2019".into())
        );
        assert!(split_date("2021-03").is_err());
        assert!(split_date("").is_err());
    }

    #[test]
    fn chart_url_has_no_double_slash() {
        assert_eq!(
            get_chart_url("https://cyberscore.me.uk/", 1054),
            "https://cyberscore.me.uk/chart/1054"
        );
    }
}
