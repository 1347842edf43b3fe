use chrono::{DateTime, Utc};
use rand::Rng;

/// URL 安全的短链接字符集 (小写字母 + 数字)
pub const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// 生成指定长度的随机 slug
///
/// 6 位时空间约 21 亿，碰撞概率不可忽略，调用方必须查重并有限次重试。
pub fn generate_slug(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// 生成订单号: FL + 日期 + 6 位随机数字，例如 FL20260214042317
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    format!(
        "FL{}{:06}",
        now.format("%Y%m%d"),
        rng.gen_range(0..=999_999)
    )
}

/// 校验 slug 仅包含允许的字符
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.bytes().all(|b| SLUG_ALPHABET.contains(&b) || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_slug() {
        let slug = generate_slug(6);
        assert_eq!(slug.len(), 6);
        assert!(slug.bytes().all(|b| SLUG_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_slug_respects_length() {
        assert_eq!(generate_slug(12).len(), 12);
        assert!(generate_slug(0).is_empty());
    }

    #[test]
    fn test_generate_order_number() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap();
        let number = generate_order_number(now);
        assert_eq!(number.len(), 16);
        assert!(number.starts_with("FL20260214"));
        assert!(number[10..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("ab12cd"));
        assert!(is_valid_slug("red-roses"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("AB12CD"));
        assert!(!is_valid_slug("ab 12"));
    }
}
