//! Authentication primitives: passwords and login credentials.
//!
//! Inbound payload parsing stays outside the domain; handlers call these
//! constructors before talking to the provisioning port.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Plain-text password held in a zeroising buffer.
///
/// Whitespace is preserved; only the empty string is rejected.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(raw: impl Into<String>) -> Result<Self, LoginValidationError> {
        let raw = Zeroizing::new(raw.into());
        if raw.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(raw))
    }

    /// Borrow the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Login credentials passed to identity stores for verification.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty. It is deliberately not
///   syntax-checked so that malformed addresses fail like unknown ones.
/// - `password` is non-empty.
///
/// # Examples
/// ```
/// use accounts::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" A@X.com ", "P@ssw0rd").unwrap();
/// assert_eq!(creds.email(), "a@x.com");
/// assert_eq!(creds.password().expose(), "P@ssw0rd");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        let password = Password::new(password)?;
        Ok(Self {
            email: normalized,
            password,
        })
    }

    /// Normalised email used for the identity lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("a@x.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn password_keeps_whitespace() {
        let password = Password::new(" secret ").expect("non-empty password");
        assert_eq!(password.expose(), " secret ");
    }

    #[rstest]
    fn password_debug_is_redacted() {
        let password = Password::new("P@ssw0rd").expect("non-empty password");
        assert_eq!(format!("{password:?}"), "Password(***)");
    }
}
