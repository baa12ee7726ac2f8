use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Input validation failure. The message is the full user-facing copy;
/// nothing framework-internal leaks through it.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Name is required.")]
    MissingName,
    #[error("A valid email address is required.")]
    InvalidEmail,
    #[error("Password is required.")]
    MissingPassword,
}

/// Raw signup form. Fields are optional so a missing field reaches
/// validation instead of bouncing as a framework-level 422.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated, normalized signup input.
#[derive(Debug)]
pub struct ValidSignup {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

fn normalize_email(raw: Option<&str>) -> Result<String, FormError> {
    let email = raw.map(|e| e.trim().to_lowercase()).unwrap_or_default();
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(FormError::InvalidEmail)
    }
}

fn require_password(raw: Option<String>) -> Result<String, FormError> {
    match raw {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(FormError::MissingPassword),
    }
}

impl SignupForm {
    pub fn validate(self) -> Result<ValidSignup, FormError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(FormError::MissingName)?;
        let email = normalize_email(self.email.as_deref())?;
        let password = require_password(self.password)?;
        Ok(ValidSignup {
            name,
            email,
            password,
        })
    }
}

impl LoginForm {
    pub fn validate(self) -> Result<ValidLogin, FormError> {
        let email = normalize_email(self.email.as_deref())?;
        let password = require_password(self.password)?;
        Ok(ValidLogin { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> SignupForm {
        SignupForm {
            name: name.map(Into::into),
            email: email.map(Into::into),
            password: password.map(Into::into),
        }
    }

    #[test]
    fn accepts_and_normalizes_valid_signup() {
        let valid = signup(Some(" Ann "), Some("  Ann@X.Com "), Some("pw"))
            .validate()
            .expect("valid input");
        assert_eq!(valid.name, "Ann");
        assert_eq!(valid.email, "ann@x.com");
        assert_eq!(valid.password, "pw");
    }

    #[test]
    fn rejects_missing_or_blank_name() {
        assert_eq!(
            signup(None, Some("a@x.com"), Some("pw")).validate().unwrap_err(),
            FormError::MissingName
        );
        assert_eq!(
            signup(Some("   "), Some("a@x.com"), Some("pw"))
                .validate()
                .unwrap_err(),
            FormError::MissingName
        );
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["", "nope", "a@b", "a b@c.com", "@x.com"] {
            assert_eq!(
                signup(Some("Ann"), Some(bad), Some("pw")).validate().unwrap_err(),
                FormError::InvalidEmail,
                "email {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_password() {
        assert_eq!(
            signup(Some("Ann"), Some("a@x.com"), Some(""))
                .validate()
                .unwrap_err(),
            FormError::MissingPassword
        );
        assert_eq!(
            signup(Some("Ann"), Some("a@x.com"), None)
                .validate()
                .unwrap_err(),
            FormError::MissingPassword
        );
    }

    #[test]
    fn login_requires_valid_email_and_password() {
        let ok = LoginForm {
            email: Some("Ann@X.com".into()),
            password: Some("pw".into()),
        }
        .validate()
        .expect("valid login");
        assert_eq!(ok.email, "ann@x.com");

        let err = LoginForm {
            email: Some("ann@x.com".into()),
            password: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FormError::MissingPassword);
    }

    #[test]
    fn form_errors_carry_human_readable_copy() {
        assert_eq!(FormError::MissingName.to_string(), "Name is required.");
        assert_eq!(
            FormError::InvalidEmail.to_string(),
            "A valid email address is required."
        );
    }
}
