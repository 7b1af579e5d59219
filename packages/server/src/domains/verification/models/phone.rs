/// Prefix `country_code` onto a directory phone number unless it already
/// carries it. Surrounding whitespace is dropped.
///
/// Only an exact prefix match counts, so a number stored as `919876543210`
/// becomes `+91919876543210`.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with(country_code) {
        trimmed.to_string()
    } else {
        format!("{}{}", country_code, trimmed)
    }
}

/// Mask all but the last four characters, for logs.
pub fn mask_phone(phone: &str) -> String {
    let visible = 4;
    let len = phone.chars().count();
    if len <= visible {
        return "*".repeat(len);
    }
    let tail: String = phone.chars().skip(len - visible).collect();
    format!("{}{}", "*".repeat(len - visible), tail)
}
