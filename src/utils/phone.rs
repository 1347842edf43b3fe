use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{9,15}$").expect("valid phone regex"))
}

/// 去掉空格、横线、括号等分隔符
pub fn normalize_phone(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// 验证收货人电话: 可选 + 前缀，9-15 位数字
pub fn validate_phone(phone: &str) -> AppResult<String> {
    let normalized = normalize_phone(phone);
    if !phone_regex().is_match(&normalized) {
        return Err(AppError::ValidationError(
            "Invalid phone number".to_string(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("081-234-5678").unwrap(), "0812345678");
        assert_eq!(validate_phone("+66 81 234 5678").unwrap(), "+66812345678");
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("phone").is_err());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(02) 123-4567"), "021234567");
        assert_eq!(normalize_phone(" +1 234 "), "+1234");
    }
}
