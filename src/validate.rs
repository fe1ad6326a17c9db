//! Local form checks run before any request leaves the process.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::error::{AuthError, AuthResult};
use crate::types::{Registration, Role};

pub const MIN_PASSWORD_LEN: usize = 6;

fn required(value: &str, label: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{label} is required")));
    }
    Ok(())
}

/// Login form: both fields present.
pub fn credentials(username: &str, password: &str) -> AuthResult<()> {
    required(username, "Username")?;
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_owned()));
    }
    Ok(())
}

/// Sign-up form.
pub fn registration(registration: &Registration) -> AuthResult<()> {
    required(&registration.username, "Username")?;
    required(&registration.name, "Name")?;
    required(&registration.email, "Email")?;
    if !is_plausible_email(registration.email.trim()) {
        return Err(AuthError::Validation("Email address is not valid".to_owned()));
    }
    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if registration.role == Role::Unknown {
        return Err(AuthError::Validation("Role must be either CUSTOMER or DEVELOPER".to_owned()));
    }
    Ok(())
}

/// Identity-provider credential: opaque, but never empty.
pub fn identity_credential(credential: &str) -> AuthResult<()> {
    if credential.trim().is_empty() {
        return Err(AuthError::Validation("Missing Google ID token".to_owned()));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
