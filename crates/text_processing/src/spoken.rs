//! Spoken-to-canonical normalization
//!
//! Recognition transcripts spell small numbers and dates out in words.
//! Downstream consumers (command routing, the answer backend) want digits,
//! so `normalize_spoken` rewrites both in a single pass. Date phrases take
//! precedence over bare number substitution within their span: in
//! "one january 2024" the "one" is the day, not a stray number.

/// Convert an English number word (zero through twenty) to its value
pub fn word_to_number(word: &str) -> Option<u32> {
    match word.to_lowercase().as_str() {
        "zero" => Some(0),
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        "thirteen" => Some(13),
        "fourteen" => Some(14),
        "fifteen" => Some(15),
        "sixteen" => Some(16),
        "seventeen" => Some(17),
        "eighteen" => Some(18),
        "nineteen" => Some(19),
        "twenty" => Some(20),
        _ => None,
    }
}

/// Convert an English month name to its number (1-12)
pub fn month_number(word: &str) -> Option<u32> {
    match word.to_lowercase().as_str() {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    }
}

/// Day of month as spoken: either a number word or one or two digits
fn parse_day(token: &str) -> Option<u32> {
    let day = word_to_number(token).or_else(|| {
        (token.len() <= 2 && !token.is_empty()).then(|| token.parse().ok()).flatten()
    })?;
    (1..=31).contains(&day).then_some(day)
}

/// Four-digit year
fn parse_year(token: &str) -> Option<u32> {
    (token.len() == 4).then(|| token.parse().ok()).flatten()
}

/// Rewrite spoken number words and `<day> <month-name> <year>` phrases as
/// digits, in one pass over the utterance.
///
/// Whitespace between tokens is normalized to single spaces; everything that
/// is neither a number word nor part of a date phrase passes through
/// untouched.
pub fn normalize_spoken(input: &str) -> String {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        // Date phrase first; it consumes three tokens and wins over the bare
        // number substitution for the day token.
        if i + 2 < tokens.len() {
            if let (Some(day), Some(month), Some(year)) = (
                parse_day(tokens[i]),
                month_number(tokens[i + 1]),
                parse_year(tokens[i + 2]),
            ) {
                out.push(format!("{:02}/{:02}/{}", day, month, year));
                i += 3;
                continue;
            }
        }

        match word_to_number(tokens[i]) {
            Some(n) => out.push(n.to_string()),
            None => out.push(tokens[i].to_string()),
        }
        i += 1;
    }

    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_words() {
        assert_eq!(word_to_number("zero"), Some(0));
        assert_eq!(word_to_number("five"), Some(5));
        assert_eq!(word_to_number("Twenty"), Some(20));
        assert_eq!(word_to_number("hundred"), None);
    }

    #[test]
    fn test_all_number_words_normalize() {
        let words = [
            "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
            "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
            "eighteen", "nineteen", "twenty",
        ];
        for (n, word) in words.iter().enumerate() {
            assert_eq!(normalize_spoken(word), n.to_string());
        }
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_number("january"), Some(1));
        assert_eq!(month_number("December"), Some(12));
        assert_eq!(month_number("janvier"), None);
    }

    #[test]
    fn test_digit_day_date() {
        assert_eq!(normalize_spoken("1 january 2024"), "01/01/2024");
        assert_eq!(normalize_spoken("25 december 1999"), "25/12/1999");
    }

    #[test]
    fn test_word_day_date() {
        assert_eq!(normalize_spoken("one january 2024"), "01/01/2024");
        assert_eq!(normalize_spoken("fifteen august 1947"), "15/08/1947");
    }

    #[test]
    fn test_date_wins_over_number_substitution() {
        // "two" would become "2" alone, but inside the date span it is
        // consumed as the day.
        assert_eq!(
            normalize_spoken("add two march 2023 and five"),
            "add 02/03/2023 and 5"
        );
    }

    #[test]
    fn test_number_words_in_context() {
        assert_eq!(
            normalize_spoken("show five alerts from branch twelve"),
            "show 5 alerts from branch 12"
        );
    }

    #[test]
    fn test_invalid_dates_left_alone() {
        // No 4-digit year: the month name stays, "one" is still replaced.
        assert_eq!(normalize_spoken("one january 24"), "1 january 24");
        // Day out of range
        assert_eq!(normalize_spoken("45 january 2024"), "45 january 2024");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize_spoken("open dashboard"), "open dashboard");
        assert_eq!(normalize_spoken(""), "");
    }
}
