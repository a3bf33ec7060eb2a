//! Account data model shared by the provisioning saga and its adapters.
//!
//! Inbound adapters build a [`UserCreationRequest`] from raw strings; identity
//! stores return [`IdentityRecord`] values; the saga projects those into
//! [`ProvisionedUser`] and [`AuthenticatedUser`] payloads.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised while building account values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyFirstName,
    EmptyLastName,
    EmptyEmail,
    InvalidEmail,
}

impl UserValidationError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyFirstName => "firstName",
            Self::EmptyLastName => "lastName",
            Self::EmptyEmail | Self::InvalidEmail => "email",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Identity identifier generated by the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, and a dot somewhere in the domain part.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address: trimmed, lower-cased and syntactically valid.
///
/// The normalised form is the uniqueness key for identity records.
///
/// # Examples
/// ```
/// use accounts::domain::EmailAddress;
///
/// let email = EmailAddress::new("  A@X.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = email.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(&normalized) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional contact fields forwarded to the profile service.
///
/// Values are trimmed; blank values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    phone_number: Option<String>,
    street_address: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

impl ContactDetails {
    /// Build contact details, dropping blank values.
    pub fn new(
        phone_number: Option<String>,
        street_address: Option<String>,
        postal_code: Option<String>,
        city: Option<String>,
    ) -> Self {
        Self {
            phone_number: non_blank(phone_number),
            street_address: non_blank(street_address),
            postal_code: non_blank(postal_code),
            city: non_blank(city),
        }
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn street_address(&self) -> Option<&str> {
        self.street_address.as_deref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }
}

/// Validated request to provision a new account.
///
/// ## Invariants
/// - `first_name` and `last_name` are trimmed and non-empty.
/// - `email` is normalised (see [`EmailAddress`]).
///
/// The value is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCreationRequest {
    first_name: String,
    last_name: String,
    email: EmailAddress,
    contact: ContactDetails,
}

impl UserCreationRequest {
    /// Validate raw name and email inputs.
    pub fn try_new(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        email: impl AsRef<str>,
        contact: ContactDetails,
    ) -> Result<Self, UserValidationError> {
        let first_name = first_name.as_ref().trim();
        if first_name.is_empty() {
            return Err(UserValidationError::EmptyFirstName);
        }
        let last_name = last_name.as_ref().trim();
        if last_name.is_empty() {
            return Err(UserValidationError::EmptyLastName);
        }
        let email = EmailAddress::new(email)?;

        Ok(Self {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email,
            contact,
        })
    }

    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Uniqueness key and login identifier.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }
}

/// Credential-bearing account record owned by an identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    id: UserId,
    email: EmailAddress,
    created: DateTime<Utc>,
    email_confirmed: bool,
}

impl IdentityRecord {
    /// Assemble a record from stored values.
    pub fn new(
        id: UserId,
        email: EmailAddress,
        created: DateTime<Utc>,
        email_confirmed: bool,
    ) -> Self {
        Self {
            id,
            email,
            created,
            email_confirmed,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn email_confirmed(&self) -> bool {
        self.email_confirmed
    }
}

/// Projection returned once both stores agree the account exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedUser {
    pub id: UserId,
    pub email: EmailAddress,
    pub created: DateTime<Utc>,
}

impl From<&IdentityRecord> for ProvisionedUser {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            created: record.created,
        }
    }
}

/// Payload of a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email_confirmed: bool,
}

impl From<&IdentityRecord> for AuthenticatedUser {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            user_id: record.id,
            email_confirmed: record.email_confirmed,
        }
    }
}
