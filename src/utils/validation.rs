use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

// 字母、数字以及 @ . + - _
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@.+\-_]{3,150}$").expect("valid username regex"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,18}$").expect("valid phone regex"));

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::ValidationError(
            "Enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if !USERNAME_REGEX.is_match(username) {
        return Err(AppError::ValidationError(
            "Username must be 3-150 characters: letters, digits and @/./+/-/_ only".to_string(),
        ));
    }
    Ok(())
}

/// 手机号可为空
pub fn validate_phone(phone: &str) -> AppResult<()> {
    if !phone.is_empty() && !PHONE_REGEX.is_match(phone) {
        return Err(AppError::ValidationError("Invalid phone number".to_string()));
    }
    Ok(())
}

/// 校验必填文本字段，返回去除首尾空白后的值
pub fn require_text(field: &str, value: &str, max_len: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::ValidationError(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// 商品单价上限（分）
pub const MAX_PRICE: i64 = 10_000_000_000;
/// 单个购物车条目的数量上限
pub const MAX_QUANTITY: i32 = 10_000;

pub fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::ValidationError(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::ValidationError(format!(
            "Quantity must be at most {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

fn amount_too_large() -> AppError {
    AppError::ValidationError("Amount is too large".to_string())
}

/// 单价 × 数量，溢出时返回校验错误
pub fn line_total(price: i64, quantity: i32) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .ok_or_else(amount_too_large)
}

/// 金额求和，溢出时返回校验错误
pub fn sum_amounts(amounts: impl IntoIterator<Item = i64>) -> AppResult<i64> {
    amounts
        .into_iter()
        .try_fold(0i64, |acc, amount| acc.checked_add(amount))
        .ok_or_else(amount_too_large)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("buyer@nexora.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("").is_ok());
        assert!(validate_phone("+91 98765-43210").is_ok());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Galaxy  ", 10).unwrap(), "Galaxy");
        assert!(require_text("name", "   ", 10).is_err());
        assert!(require_text("name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_amount_overflow_is_rejected() {
        assert_eq!(line_total(12_000, 3).unwrap(), 36_000);
        assert!(matches!(
            line_total(i64::MAX / 2 + 1, 2),
            Err(AppError::ValidationError(_))
        ));

        assert_eq!(sum_amounts([100, 250, 5]).unwrap(), 355);
        assert_eq!(sum_amounts(Vec::new()).unwrap(), 0);
        assert!(sum_amounts([i64::MAX, 1]).is_err());
    }
}
