//! Phone number masking for log output

/// Mask a phone number for logging, keeping only the last four digits
pub fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return "unknown".to_string();
    }
    if digits.len() <= 4 {
        return format!("***{}", digits);
    }
    format!("***{}", &digits[digits.len() - 4..])
}
