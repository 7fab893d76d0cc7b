use rand::Rng;

const COUPON_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成8位优惠券码（大写字母与数字，去掉易混淆的 0/O/1/I）
pub fn generate_coupon_code() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| COUPON_ALPHABET[rng.gen_range(0..COUPON_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_coupon_code() {
        let code = generate_coupon_code();
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| COUPON_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generate_multiple_codes() {
        let code1 = generate_coupon_code();
        let code2 = generate_coupon_code();
        // 理论上可能相同，这里只确认函数可以重复调用
        assert_eq!(code1.len(), 8);
        assert_eq!(code2.len(), 8);
    }
}
