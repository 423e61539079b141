//! Natural ordering of bioassay sample identifiers such as `Ⅲ2-16`.

use std::sync::LazyLock;

use regex::Regex;

const REFERENCE_MARKER: &str = "阿维菌素";
const CONTROL_MARKERS: [&str; 3] = ["CK", "ck", "对照"];

/// Rank of labels carrying no number at all.
pub const RANK_UNPARSED: u32 = 996;
/// Rank of labels that only carry plain numbers (e.g. `B-007`).
pub const RANK_NUMBERED: u32 = 997;
/// Rank of the reference compound rows.
pub const RANK_REFERENCE: u32 = 998;
/// Rank of blank/CK control rows.
pub const RANK_CONTROL: u32 = 999;

/// Ordering tuple for a sample label, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pub group: u32,
    pub major: u64,
    pub minor: u64,
}

impl SortKey {
    pub const fn new(group: u32, major: u64, minor: u64) -> Self {
        SortKey { group, major, minor }
    }

    pub fn as_tuple(&self) -> (u32, u64, u64) {
        (self.group, self.major, self.minor)
    }
}

/// Compute the ordering key of a label.
pub fn sort_key(label: &str) -> SortKey {
    let label = label.trim();

    if label.contains(REFERENCE_MARKER) {
        return SortKey::new(RANK_REFERENCE, 0, 0);
    }
    if CONTROL_MARKERS.iter().any(|m| label.contains(m)) {
        return SortKey::new(RANK_CONTROL, 0, 0);
    }
    if let Some(key) = numeral_key(label) {
        return key;
    }

    let mut numbers = digit_runs(label);
    match numbers.next() {
        Some(first) => SortKey::new(RANK_NUMBERED, first, numbers.next().unwrap_or(0)),
        None => SortKey::new(RANK_UNPARSED, 0, 0),
    }
}

static NUMERAL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩIVX]+)\s*(\d+)-(\d+)$").expect("numeral label pattern")
});
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern"));
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").expect("digit pattern"));

fn numeral_value(block: &str) -> u32 {
    match block {
        "Ⅰ" | "I" => 1,
        "Ⅱ" | "II" => 2,
        "Ⅲ" | "III" => 3,
        "Ⅳ" | "IV" => 4,
        "Ⅴ" | "V" => 5,
        "Ⅵ" | "VI" => 6,
        "Ⅶ" | "VII" => 7,
        "Ⅷ" | "VIII" => 8,
        "Ⅸ" | "IX" => 9,
        "Ⅹ" | "X" => 10,
        _ => 0,
    }
}

/// `<numerals>\s*<major>-<minor>` over the whole label.
fn numeral_key(label: &str) -> Option<SortKey> {
    let caps = NUMERAL_LABEL.captures(label)?;
    Some(SortKey::new(
        numeral_value(&caps[1]),
        parse_digits(&caps[2]),
        parse_digits(&caps[3]),
    ))
}

fn digit_runs(s: &str) -> impl Iterator<Item = u64> + '_ {
    DIGIT_RUN.find_iter(s).map(|m| parse_digits(m.as_str()))
}

/// Decimal value of a run of Unicode digits, saturating at `u64::MAX`.
fn parse_digits(digits: &str) -> u64 {
    digits.chars().fold(0u64, |acc, c| {
        acc.saturating_mul(10).saturating_add(u64::from(digit_value(c)))
    })
}

fn is_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Unicode lays every decimal digit set out as a contiguous 0..=9 range, so
/// the value is the distance from the start of the run, modulo 10.
fn digit_value(c: char) -> u32 {
    if let Some(d) = c.to_digit(10) {
        return d;
    }
    let mut zero = u32::from(c);
    while zero > 0 && char::from_u32(zero - 1).is_some_and(is_digit) {
        zero -= 1;
    }
    (u32::from(c) - zero) % 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_examples() {
        assert_eq!(sort_key("Ⅲ2-16").as_tuple(), (3, 2, 16));
        assert_eq!(sort_key("CK").as_tuple(), (999, 0, 0));
        assert_eq!(sort_key("阿维菌素").as_tuple(), (998, 0, 0));
        assert_eq!(sort_key("B-007").as_tuple(), (997, 7, 0));
        assert_eq!(sort_key("hello").as_tuple(), (996, 0, 0));
    }

    #[test]
    fn reference_marker_wins_over_control() {
        assert_eq!(sort_key("阿维菌素CK").group, RANK_REFERENCE);
        assert_eq!(sort_key("空白对照").group, RANK_CONTROL);
        assert_eq!(sort_key("ck-2").group, RANK_CONTROL);
    }

    #[test]
    fn ascii_and_unicode_numerals() {
        assert_eq!(sort_key("IV 3-12").as_tuple(), (4, 3, 12));
        assert_eq!(sort_key("Ⅹ1-1").as_tuple(), (10, 1, 1));
        assert_eq!(sort_key("  Ⅲ 2-01 ").as_tuple(), (3, 2, 1));
    }

    #[test]
    fn unmapped_numeral_block_ranks_zero() {
        assert_eq!(sort_key("IIII2-3").as_tuple(), (0, 2, 3));
        assert_eq!(sort_key("ⅢI2-3").as_tuple(), (0, 2, 3));
    }

    #[test]
    fn partial_numeral_pattern_falls_through_to_numbers() {
        assert_eq!(sort_key("Ⅲ2-16a").as_tuple(), (997, 2, 16));
        assert_eq!(sort_key("Ⅲ2").as_tuple(), (997, 2, 0));
        assert_eq!(sort_key("化合物-03").as_tuple(), (997, 3, 0));
    }

    #[test]
    fn full_width_digits_parse() {
        assert_eq!(sort_key("Ⅲ２-１６").as_tuple(), (3, 2, 16));
        assert_eq!(sort_key("B-００７").as_tuple(), (997, 7, 0));
        assert_eq!(sort_key("Ⅱ 1-１").as_tuple(), (2, 1, 1));
    }

    #[test]
    fn other_decimal_scripts_parse() {
        assert_eq!(sort_key("Ⅰ٣-١٢").as_tuple(), (1, 3, 12));
        assert_eq!(digit_value('𝟗'), 9);
        assert_eq!(digit_value('𝟘'), 0);
    }

    #[test]
    fn huge_numbers_saturate() {
        let key = sort_key("x99999999999999999999999");
        assert_eq!(key.major, u64::MAX);
    }

    #[test]
    fn unparsed_sorts_before_numbered_and_controls_last() {
        let mut labels = vec!["CK", "阿维菌素", "B-2", "hello", "Ⅱ1-1", "Ⅰ3-2"];
        labels.sort_by_key(|l| sort_key(l));
        assert_eq!(labels, vec!["Ⅰ3-2", "Ⅱ1-1", "hello", "B-2", "阿维菌素", "CK"]);
    }
}
