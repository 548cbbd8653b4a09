use rand::Rng;

/// 课程代码字符集，去掉了易混淆的 0/O/1/I
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成课程代码
pub fn generate_course_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length() {
        assert_eq!(generate_course_code(8).len(), 8);
        assert_eq!(generate_course_code(6).len(), 6);
    }

    #[test]
    fn test_code_charset() {
        let code = generate_course_code(64);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        // 不应出现易混淆字符
        assert!(!code.contains('0'));
        assert!(!code.contains('O'));
        assert!(!code.contains('1'));
        assert!(!code.contains('I'));
    }

    #[test]
    fn test_codes_differ() {
        let a = generate_course_code(8);
        let b = generate_course_code(8);
        // 理论上可能相等，但 32^8 的空间下碰撞概率可以忽略
        assert_ne!(a, b);
    }
}
