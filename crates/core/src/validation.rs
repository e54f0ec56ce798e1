//! Local form validation shared by every `Create*`/`Update*` form.
//!
//! Forms derive [`validator::Validate`]; [`validate_form`] runs the derived
//! rules and converts failures into [`CoreError::Validation`] so invalid
//! input never reaches the network.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Minimum number of digits in a Brazilian phone number (DDD + number).
pub const MIN_PHONE_DIGITS: usize = 10;

/// Maximum number of digits, allowing the `55` country prefix.
pub const MAX_PHONE_DIGITS: usize = 13;

static PHONE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9()\-\s.]+$").expect("phone regex is valid"));

/// Run the derived validation rules of a form.
pub fn validate_form<T: Validate>(form: &T) -> Result<(), CoreError> {
    form.validate().map_err(CoreError::from)
}

/// Flatten validation errors into `field -> messages`, using dotted paths
/// for nested structs and `field[index]` for lists.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect(errors, "", &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = list
                    .iter()
                    .map(|e| match &e.message {
                        Some(msg) => msg.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect::<Vec<_>>();
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Extract the digits of a phone number, ignoring formatting characters.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Phone numbers accept formatting characters but must carry between
/// [`MIN_PHONE_DIGITS`] and [`MAX_PHONE_DIGITS`] digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !PHONE_CHARS.is_match(phone) {
        return Err(error("phone_format", "telefone contém caracteres inválidos"));
    }
    let digits = phone_digits(phone).len();
    if digits < MIN_PHONE_DIGITS {
        return Err(error(
            "phone_too_short",
            "telefone deve ter pelo menos 10 dígitos",
        ));
    }
    if digits > MAX_PHONE_DIGITS {
        return Err(error("phone_too_long", "telefone deve ter no máximo 13 dígitos"));
    }
    Ok(())
}

/// Validate a CPF by its two check digits.
pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return Err(error("cpf_invalid", "CPF inválido"));
    }
    let check = |len: usize| {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 {
            0
        } else {
            rest
        }
    };
    if check(9) != digits[9] || check(10) != digits[10] {
        return Err(error("cpf_invalid", "CPF inválido"));
    }
    Ok(())
}

/// Reject strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "campo obrigatório"));
    }
    Ok(())
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct ContactForm {
        #[validate(custom(function = "validate_phone"))]
        phone: String,
        #[validate(custom(function = "validate_cpf"))]
        cpf: Option<String>,
    }

    #[test]
    fn phone_with_formatting_is_accepted() {
        assert!(validate_phone("(11) 98765-4321").is_ok());
        assert!(validate_phone("+55 11 98765-4321").is_ok());
    }

    #[test]
    fn short_phone_is_rejected() {
        let err = validate_phone("123").unwrap_err();
        assert_eq!(err.code, "phone_too_short");
    }

    #[test]
    fn phone_with_letters_is_rejected() {
        assert_eq!(validate_phone("11 9abc-4321").unwrap_err().code, "phone_format");
    }

    #[test]
    fn valid_cpf_passes() {
        assert!(validate_cpf("529.982.247-25").is_ok());
    }

    #[test]
    fn cpf_with_wrong_check_digit_fails() {
        assert!(validate_cpf("529.982.247-26").is_err());
        assert!(validate_cpf("111.111.111-11").is_err());
        assert!(validate_cpf("123").is_err());
    }

    #[test]
    fn blank_is_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("Ana").is_ok());
    }

    #[test]
    fn field_messages_lists_each_failing_field() {
        let form = ContactForm {
            phone: "123".into(),
            cpf: Some("000".into()),
        };
        let errors = form.validate().unwrap_err();
        let messages = field_messages(&errors);
        assert_eq!(
            messages["phone"],
            vec!["telefone deve ter pelo menos 10 dígitos".to_string()]
        );
        assert_eq!(messages["cpf"], vec!["CPF inválido".to_string()]);
    }

    #[test]
    fn validate_form_maps_to_core_validation() {
        let form = ContactForm {
            phone: "123".into(),
            cpf: None,
        };
        let err = validate_form(&form).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref msg) if msg.starts_with("phone:")));
    }
}
