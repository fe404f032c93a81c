use super::domain::Region;
use super::inputs::normalise_postcode;

/// Postcode areas north of the border. TD straddles it and is treated as England.
const SCOTTISH_AREAS: &[&str] = &[
    "AB", "DD", "DG", "EH", "FK", "G", "HS", "IV", "KA", "KW", "KY", "ML", "PA", "PH", "ZE",
];

/// Welsh postcode areas. SY and CH straddle the border and stay with England.
const WELSH_AREAS: &[&str] = &["CF", "LD", "LL", "NP", "SA"];

/// Outward code (the part before the inward code) of a postcode-like string.
pub fn outward_code(raw: &str) -> String {
    normalise_postcode(raw)
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Classifies a postcode into a jurisdiction. Never fails; unrecognisable input is `Unknown`.
pub fn region_from_postcode(raw: &str) -> Region {
    let outward = outward_code(raw);
    if outward.is_empty() {
        return Region::Unknown;
    }

    if outward.starts_with("BT") {
        return Region::NorthernIreland;
    }

    let area: String = outward
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect();

    if SCOTTISH_AREAS.contains(&area.as_str()) && is_outward_shape(&outward) {
        return Region::Scotland;
    }

    if WELSH_AREAS.contains(&area.as_str()) && is_outward_shape(&outward) {
        return Region::Wales;
    }

    if is_outward_shape(&outward) {
        return Region::England;
    }

    Region::Unknown
}

/// Matches `[A-Z]{1,2}\d[A-Z0-9]?`, which also covers `[A-Z]{1,2}\d{1,2}`.
fn is_outward_shape(outward: &str) -> bool {
    let bytes = outward.as_bytes();
    let letters = bytes
        .iter()
        .take_while(|byte| byte.is_ascii_uppercase())
        .count();
    if !(1..=2).contains(&letters) {
        return false;
    }

    let rest = &bytes[letters..];
    match rest {
        [digit] => digit.is_ascii_digit(),
        [digit, tail] => {
            digit.is_ascii_digit() && (tail.is_ascii_digit() || tail.is_ascii_uppercase())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_nation() {
        assert_eq!(region_from_postcode("BT1 1AA"), Region::NorthernIreland);
        assert_eq!(region_from_postcode("EH1 1AA"), Region::Scotland);
        assert_eq!(region_from_postcode("G2 1AB"), Region::Scotland);
        assert_eq!(region_from_postcode("CF10 1AA"), Region::Wales);
        assert_eq!(region_from_postcode("B3 2JR"), Region::England);
        assert_eq!(region_from_postcode("SW1A 1AA"), Region::England);
        assert_eq!(region_from_postcode(""), Region::Unknown);
    }

    #[test]
    fn area_match_is_exact_not_prefix() {
        assert_eq!(region_from_postcode("GL1 1AA"), Region::England);
        assert_eq!(region_from_postcode("SA1 1AA"), Region::Wales);
        assert_eq!(region_from_postcode("SY23 1AA"), Region::England);
    }

    #[test]
    fn normalises_case_and_spacing() {
        assert_eq!(region_from_postcode("  eh11aa "), Region::Scotland);
        assert_eq!(outward_code("cf101aa"), "CF10");
    }

    #[test]
    fn rejects_non_postcodes() {
        assert_eq!(region_from_postcode("hello world"), Region::Unknown);
        assert_eq!(region_from_postcode("12345"), Region::Unknown);
        assert_eq!(region_from_postcode("???"), Region::Unknown);
    }
}
