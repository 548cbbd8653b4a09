use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

static Q_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[qQ]?[0-9]{6,8}$").expect("Invalid q-number regex"));

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 学号格式校验：可选 q 前缀 + 6-8 位数字
pub fn validate_q_number(q_number: &str) -> Result<(), &'static str> {
    if !Q_NUMBER_RE.is_match(q_number) {
        return Err("Student number format is invalid");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_valid_q_number() {
        assert!(validate_q_number("q1234567").is_ok());
        assert!(validate_q_number("Q7654321").is_ok());
        assert!(validate_q_number("123456").is_ok());
    }

    #[test]
    fn test_invalid_q_number() {
        assert!(validate_q_number("q12").is_err());
        assert!(validate_q_number("abc12345").is_err());
        assert!(validate_q_number("").is_err());
    }
}
