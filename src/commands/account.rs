//! Account commands: register, login and reset-password.

use crate::accounts;
use crate::args::{Credentials, RegisterArgs, ResetPasswordArgs};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::anyhow;

/// Creates a user account.
///
/// # Errors
///
/// - Returns an `ErrorType::Conflict` error if the username is taken.
/// - Returns an `ErrorType::Validation` error if a field is empty, the email has no `@` or the
///   phone is not all digits.
pub fn register(config: &Config, args: RegisterArgs) -> Result<Out<String>> {
    let mut store = config.profile_store();
    accounts::register(
        &mut store,
        &args.username,
        &args.password,
        &args.email,
        &args.phone,
    )?;
    let username = args.username.trim().to_string();
    Ok(Out::new(
        format!("Registered '{username}'. Passwords are stored in plain text."),
        username,
    ))
}

/// Checks a username and password.
///
/// # Errors
///
/// - Returns an `ErrorType::Unauthorized` error if they do not match.
pub fn login(config: &Config, credentials: Credentials) -> Result<Out<String>> {
    let store = config.profile_store();
    accounts::login(&store, &credentials.username, &credentials.password)?;
    Ok(Out::new(
        format!("Welcome, {}", credentials.username),
        credentials.username,
    ))
}

/// Sets a new password on the account found by email or phone.
///
/// # Errors
///
/// - Returns an `ErrorType::NotFound` error if no account has the email or phone.
pub fn reset_password(config: &Config, args: ResetPasswordArgs) -> Result<Out<String>> {
    let contact = args
        .contact()
        .ok_or_else(|| anyhow!("Give either an email or a phone number"))
        .pub_result(ErrorType::Validation)?;
    let mut store = config.profile_store();
    let username = accounts::reset_password(&mut store, &contact, &args.new_password)?;
    Ok(Out::new(
        format!("Password changed for '{username}'"),
        username,
    ))
}
