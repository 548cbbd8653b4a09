/// 转义 LIKE 模式中的特殊字符
///
/// 用户输入直接拼入 LIKE 模式前必须先经过这里，
/// 否则 % 和 _ 会被当作通配符。
pub fn escape_like_pattern(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_percent() {
        assert_eq!(escape_like_pattern("100%"), "100\\%");
    }

    #[test]
    fn test_escape_underscore() {
        assert_eq!(escape_like_pattern("q_number"), "q\\_number");
    }

    #[test]
    fn test_escape_backslash_first() {
        assert_eq!(escape_like_pattern("a\\%b"), "a\\\\\\%b");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_like_pattern("Alice"), "Alice");
    }
}
