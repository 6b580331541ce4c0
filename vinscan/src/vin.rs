//! ISO 3779 VIN check-digit validation and free-text VIN extraction.
//!
//! A VIN is 17 characters over `[A-HJ-NPR-Z0-9]` — the letters I, O and Q
//! are excluded because they are visually confusable with 1 and 0. Position
//! 9 (index 8) is a check digit derived from a weighted sum of the other 16
//! characters, which lets transcription errors from OCR be caught without
//! any network lookup.

use std::sync::OnceLock;

use regex::Regex;

/// Per-position weights; index 8 is the check digit itself and carries
/// weight 0.
const WEIGHTS: [u32; 17] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

fn vin_candidate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[A-HJ-NPR-Z0-9]{17}").expect("VIN candidate pattern is valid")
    })
}

/// ISO 3779 transliteration value for a single VIN character, already
/// upper-cased. `None` for characters outside the VIN alphabet.
fn transliterate(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A' => Some(1),
        'B' => Some(2),
        'C' => Some(3),
        'D' => Some(4),
        'E' => Some(5),
        'F' => Some(6),
        'G' => Some(7),
        'H' => Some(8),
        'J' => Some(1),
        'K' => Some(2),
        'L' => Some(3),
        'M' => Some(4),
        'N' => Some(5),
        'P' => Some(7),
        'R' => Some(9),
        'S' => Some(2),
        'T' => Some(3),
        'U' => Some(4),
        'V' => Some(5),
        'W' => Some(6),
        'X' => Some(7),
        'Y' => Some(8),
        'Z' => Some(9),
        _ => None,
    }
}

/// Validates a candidate VIN against the ISO 3779 check digit.
///
/// Case-insensitive. Any input that is not exactly 17 characters over the
/// VIN alphabet returns `false` immediately; in particular the letters I, O
/// and Q are rejected regardless of length.
pub fn is_valid_vin(candidate: &str) -> bool {
    let chars: Vec<char> = candidate.chars().map(|c| c.to_ascii_uppercase()).collect();
    if chars.len() != 17 {
        return false;
    }

    let mut sum: u32 = 0;
    for (i, &c) in chars.iter().enumerate() {
        let Some(value) = transliterate(c) else {
            return false;
        };
        if i == 8 {
            continue;
        }
        sum += value * WEIGHTS[i];
    }

    let expected = match sum % 11 {
        10 => 'X',
        n => char::from_digit(n, 10).unwrap_or('0'),
    };

    chars[8] == expected
}

/// Scans arbitrary OCR text for 17-character VIN candidates and returns the
/// first one (in order of appearance) that passes the check digit,
/// upper-cased.
///
/// Candidates with the right length and alphabet but a wrong check digit are
/// skipped in favor of a later valid one; `None` when nothing validates.
pub fn extract_vin_from_text(text: &str) -> Option<String> {
    vin_candidate_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_uppercase())
        .find(|candidate| is_valid_vin(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known-valid VINs (correct check digit at position 9).
    const VALID_VINS: [&str; 3] = [
        "1HGCM82633A004352",
        "1M8GDM9AXKP042788",
        "5YJSA1DG9DFP14705",
    ];

    #[test]
    fn accepts_known_valid_vins() {
        for vin in VALID_VINS {
            assert!(is_valid_vin(vin), "{vin} should validate");
        }
    }

    #[test]
    fn is_case_insensitive() {
        assert!(is_valid_vin("1hgcm82633a004352"));
        assert!(is_valid_vin("1HgCm82633a004352"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid_vin(""));
        assert!(!is_valid_vin("1HGCM82633A00435"));
        assert!(!is_valid_vin("1HGCM82633A0043522"));
    }

    #[test]
    fn rejects_excluded_letters() {
        // I, O, Q are outside the VIN alphabet no matter where they appear.
        assert!(!is_valid_vin("IHGCM82633A123456"));
        assert!(!is_valid_vin("1HGCM82633A12345O"));
        assert!(!is_valid_vin("1HGCM82Q33A123456"));
    }

    #[test]
    fn rejects_every_other_check_digit() {
        // Mutating position 9 of a valid VIN to any other legal character
        // must fail. The weight at position 9 is 0, so the expected check
        // character is unchanged by the mutation.
        let vin = "1HGCM82633A004352";
        let original = vin.chars().nth(8).unwrap();
        for c in "0123456789ABCDEFGHJKLMNPRSTUVWXYZ".chars() {
            if c == original {
                continue;
            }
            let mut mutated: Vec<char> = vin.chars().collect();
            mutated[8] = c;
            let mutated: String = mutated.into_iter().collect();
            assert!(!is_valid_vin(&mutated), "{mutated} should not validate");
        }
    }

    #[test]
    fn check_digit_x_is_remainder_ten() {
        // 1M8GDM9AXKP042788 is the classic remainder-10 example.
        assert!(is_valid_vin("1M8GDM9AXKP042788"));
        assert!(!is_valid_vin("1M8GDM9A0KP042788"));
    }

    #[test]
    fn extracts_vin_from_surrounding_text() {
        assert_eq!(
            extract_vin_from_text("VIN: 1HGCM82633A004352 Model: Honda Accord"),
            Some("1HGCM82633A004352".to_string())
        );
    }

    #[test]
    fn extraction_uppercases_result() {
        assert_eq!(
            extract_vin_from_text("vin 1hgcm82633a004352"),
            Some("1HGCM82633A004352".to_string())
        );
    }

    #[test]
    fn returns_none_when_no_candidate() {
        assert_eq!(extract_vin_from_text("No VIN here, just random text"), None);
        assert_eq!(extract_vin_from_text(""), None);
    }

    #[test]
    fn returns_none_when_candidates_fail_validation() {
        // Right length and alphabet, wrong check digit.
        assert_eq!(extract_vin_from_text("1HGCM82634A123456"), None);
    }

    #[test]
    fn skips_invalid_candidate_for_later_valid_one() {
        // First candidate fails the check digit, second passes: the policy
        // is validates-first-found, not first-syntactic-match.
        let text = "plate A: 1HGCM82633A123456 plate B: 1HGCM82633A004352";
        assert_eq!(
            extract_vin_from_text(text),
            Some("1HGCM82633A004352".to_string())
        );
    }

    #[test]
    fn excluded_letters_break_candidate_runs() {
        // An I in the middle prevents a 17-character run from forming.
        assert_eq!(extract_vin_from_text("1HGCM826I33A123456"), None);
    }
}
