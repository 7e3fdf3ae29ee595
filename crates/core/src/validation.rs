//! Client-side validation support
//!
//! Request bodies and configuration are checked locally before anything
//! touches the network. Failures collect every message so the caller can
//! show them all at once.

use crate::error::ApiError;
use std::fmt;

/// Every validation message produced for one value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record the error of a single check, if any
    pub fn check(&mut self, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.messages.push(message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors.messages)
    }
}

/// Trait for values that can be checked before being sent
pub trait Validate {
    /// Returns Ok(()) if valid, or every problem found
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Common validation helpers
pub mod validators {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err(format!("{field}: não pode ficar em branco"));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(value: &str, field: &str) -> Result<(), String> {
        url::Url::parse(value).map_err(|e| format!("{field}: URL inválida - {e}"))?;
        Ok(())
    }

    /// Validate email format (basic check)
    pub fn validate_email(email: &str, field: &str) -> Result<(), String> {
        let mut parts = email.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.')
        );
        if !valid {
            return Err(format!("{field}: e-mail inválido"));
        }
        Ok(())
    }

    /// Validate a minimum length in characters
    pub fn validate_min_len(value: &str, min: usize, field: &str) -> Result<(), String> {
        if value.chars().count() < min {
            return Err(format!("{field}: mínimo de {min} caracteres"));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), String> {
        if value < min || value > max {
            return Err(format!("{field}: deve estar entre {min} e {max}"));
        }
        Ok(())
    }

    /// Validate a CPF, check digits included
    pub fn validate_cpf(value: &str, field: &str) -> Result<(), String> {
        let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
        let invalid = || -> Result<(), String> { Err(format!("{field}: CPF inválido")) };

        if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
            return invalid();
        }

        let check_digit = |len: usize| -> u32 {
            let sum: u32 = digits[..len]
                .iter()
                .zip((2..=len as u32 + 1).rev())
                .map(|(d, w)| d * w)
                .sum();
            match sum % 11 {
                0 | 1 => 0,
                r => 11 - r,
            }
        };

        if check_digit(9) != digits[9] || check_digit(10) != digits[10] {
            return invalid();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;

    struct Coupon {
        code: String,
        discount: u8,
    }

    impl Validate for Coupon {
        fn validate(&self) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            errors
                .check(validate_not_empty(&self.code, "código"))
                .check(validate_range(self.discount, 1, 100, "desconto"));
            errors.into_result()
        }
    }

    #[test]
    fn collects_all_messages() {
        let coupon = Coupon {
            code: " ".into(),
            discount: 0,
        };
        let errors = coupon.validate().unwrap_err();
        assert_eq!(errors.messages().len(), 2);

        let api: ApiError = errors.into();
        assert_eq!(api.code, 400);
        assert_eq!(
            api.message,
            "código: não pode ficar em branco; desconto: deve estar entre 1 e 100"
        );
    }

    #[test]
    fn valid_value_passes() {
        let coupon = Coupon {
            code: "LAVA10".into(),
            discount: 10,
        };
        assert!(coupon.validate().is_ok());
    }

    #[test]
    fn email_check() {
        assert!(validate_email("admin@uau.com.br", "email").is_ok());
        assert!(validate_email("admin", "email").is_err());
        assert!(validate_email("@uau.com", "email").is_err());
        assert!(validate_email("a@b@c.com", "email").is_err());
    }

    #[test]
    fn cpf_check() {
        assert!(validate_cpf("529.982.247-25", "cpf").is_ok());
        assert!(validate_cpf("52998224724", "cpf").is_err());
        assert!(validate_cpf("111.111.111-11", "cpf").is_err());
        assert!(validate_cpf("123", "cpf").is_err());
    }

    #[test]
    fn url_check() {
        assert!(validate_url("https://api.uauclubelavacar.com.br", "api_url").is_ok());
        assert!(validate_url("not a url", "api_url").is_err());
    }
}
