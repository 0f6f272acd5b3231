//! User identity helpers.

use uuid::Uuid;
use validator::ValidateEmail;

use super::{error::DomainError, types::UserRole};

const MAX_EMAIL_LEN: usize = 320;
const PHONE_DIGITS: usize = 9;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins may act on any account; everyone else only on their own.
    pub fn can_access_user(&self, user_id: Uuid) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

/// Trim and lowercase an email address, then check its syntax.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email is required"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(DomainError::validation("email is too long"));
    }
    if !email.validate_email() {
        return Err(DomainError::validation("invalid email format"));
    }
    // The local-part grammar accepted above still allows empty dot-atoms.
    let local = email.split('@').next().unwrap_or_default();
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(DomainError::validation("invalid email format"));
    }

    Ok(email)
}

/// Phone numbers are stored as exactly nine digits; blank input means none.
pub fn normalize_phone(raw: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if value.len() != PHONE_DIGITS || !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "phone number must be {PHONE_DIGITS} digits"
        )));
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        let email = normalize_email("  Barista@Example.COM ").expect("valid email");
        assert_eq!(email, "barista@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in [
            "",
            "no-at-sign",
            "@example.com",
            "a@b@example.com",
            "user@example..com",
            "us er@example.com",
            "a@-.-",
            "\"@x.y",
            "a..b@c.d",
            ".a@c.d",
            "a.@c.d",
            "a@b.c,d",
            "<a>@b.c",
        ] {
            assert!(normalize_email(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn common_address_shapes_are_accepted() {
        for raw in ["first.last@example.com", "ada+coffee@mail.example.org", "x@b.co"] {
            assert_eq!(normalize_email(raw).expect("valid email"), raw);
        }
    }

    #[test]
    fn phone_numbers_are_nine_digits() {
        assert_eq!(
            normalize_phone(Some("912345678")).expect("valid phone"),
            Some("912345678".to_string())
        );
        assert_eq!(normalize_phone(Some("  ")).expect("blank phone"), None);
        assert_eq!(normalize_phone(None).expect("missing phone"), None);
        assert!(normalize_phone(Some("12345")).is_err());
        assert!(normalize_phone(Some("91234567x")).is_err());
    }

    #[test]
    fn only_admins_access_other_accounts() {
        let owner = Uuid::new_v4();
        let someone = Uuid::new_v4();
        let user = Actor::new(owner, UserRole::User);
        let admin = Actor::new(someone, UserRole::Admin);

        assert!(user.can_access_user(owner));
        assert!(!user.can_access_user(someone));
        assert!(admin.can_access_user(owner));
    }
}
