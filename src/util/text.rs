/// Normalizes a scraped numeric string for display: trims whitespace and
/// replaces the first decimal comma with a period ("41,55" => "41.55").
///
/// Only the first comma is touched; the exchange renders one decimal comma
/// per value and no thousands separators.
pub fn normalize_decimal_comma(s: &str) -> String {
    s.trim().replacen(',', ".", 1)
}
