//! Account flows built on `ProfileStore`: registration, log in, password reset and profile edits.
//!
//! Passwords are stored in plain text and log in is a plain string comparison. This is a
//! placeholder, not authentication: it keeps casual users apart on a shared machine and nothing
//! more. Do not put real credentials in a ledger.

use crate::error::{ErrorType, IntoResult};
use crate::model::{validate_email, validate_phone, PersonalInfo, Profile};
use crate::store::{Contact, ProfileStore};
use crate::Result;
use anyhow::{anyhow, ensure};
use tracing::{info, warn};

/// Creates a profile for `username`. All four values are required, the username must not be
/// taken, the email must contain `@` and the phone must be digits only.
pub fn register(
    store: &mut ProfileStore,
    username: &str,
    password: &str,
    email: &str,
    phone: &str,
) -> Result<()> {
    let (username, email, phone) = (username.trim(), email.trim(), phone.trim());
    check_required(&[username, password, email, phone]).pub_result(ErrorType::Validation)?;
    if store.contains(username) {
        return Err(anyhow!("Username '{username}' is already taken")).pub_result(ErrorType::Conflict);
    }
    validate_email(email).pub_result(ErrorType::Validation)?;
    validate_phone(phone).pub_result(ErrorType::Validation)?;
    store.upsert(username, Profile::registered(password, email, phone))?;
    info!("Registered user '{username}'");
    Ok(())
}

/// Checks `password` against the stored one with a plain equality test and returns the profile.
/// Unknown users and wrong passwords produce the same `ErrorType::Unauthorized` error.
pub fn login<'a>(store: &'a ProfileStore, username: &str, password: &str) -> Result<&'a Profile> {
    check_required(&[username, password]).pub_result(ErrorType::Validation)?;
    warn!("Passwords are stored and compared in plain text");
    match store.get(username) {
        Some(profile) if profile.password == password => {
            info!("User '{username}' logged in");
            Ok(profile)
        }
        _ => Err(anyhow!("Wrong username or password")).pub_result(ErrorType::Unauthorized),
    }
}

/// Sets a new password for the user who registered `contact` and returns their username.
pub fn reset_password(
    store: &mut ProfileStore,
    contact: &Contact,
    new_password: &str,
) -> Result<String> {
    check_required(&[new_password]).pub_result(ErrorType::Validation)?;
    let username = store
        .find_by_contact(contact)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("No user is registered with {}", describe(contact)))
        .pub_result(ErrorType::NotFound)?;
    let mut profile = store
        .get(&username)
        .cloned()
        .ok_or_else(|| anyhow!("User '{username}' not found"))
        .pub_result(ErrorType::NotFound)?;
    profile.password = new_password.to_string();
    store.upsert(&username, profile)?;
    info!("Password reset for '{username}'");
    Ok(username)
}

/// Validates `info` and replaces the personal details of `username`, keeping the password.
pub fn update_profile(store: &mut ProfileStore, username: &str, info: PersonalInfo) -> Result<()> {
    let info = info.validated().pub_result(ErrorType::Validation)?;
    let password = store
        .get(username)
        .map(|p| p.password.clone())
        .ok_or_else(|| anyhow!("User '{username}' not found"))
        .pub_result(ErrorType::NotFound)?;
    let profile = Profile {
        password,
        name: info.name,
        dob: info.dob,
        email: info.email,
        phone: info.phone,
        role: info.role,
    };
    store.upsert(username, profile)
}

fn check_required(values: &[&str]) -> Result<()> {
    ensure!(
        values.iter().all(|v| !v.is_empty()),
        "Please fill in every field"
    );
    Ok(())
}

fn describe(contact: &Contact) -> String {
    match contact {
        Contact::Email(email) => format!("email {email}"),
        Contact::Phone(phone) => format!("phone {phone}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::Role;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ProfileStore {
        let mut store = ProfileStore::new(dir.path().join("users.json"));
        register(&mut store, "lan", "pw1", "lan@x.vn", "0901").unwrap();
        store
    }

    #[test]
    fn test_register_creates_default_profile() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let profile = ProfileStore::open(store.path()).get("lan").cloned().unwrap();
        assert_eq!(profile.password, "pw1");
        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.name, "");
    }

    #[test]
    fn test_register_username_taken() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let err = register(&mut store, "lan", "other", "o@x.vn", "1").unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Conflict));
        assert_eq!(store.get("lan").unwrap().password, "pw1");
    }

    #[test]
    fn test_register_validation() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        for (user, pw, email, phone) in [
            ("a", "", "a@x", "1"),
            ("b", "pw", "no-at-sign", "1"),
            ("c", "pw", "c@x", "09-01"),
        ] {
            let err = register(&mut store, user, pw, email, phone).unwrap_err();
            assert_eq!(error_type(&err), Some(ErrorType::Validation));
            assert!(!store.contains(user));
        }
    }

    #[test]
    fn test_login() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(login(&store, "lan", "pw1").is_ok());

        let wrong = login(&store, "lan", "nope").unwrap_err();
        assert_eq!(error_type(&wrong), Some(ErrorType::Unauthorized));
        let unknown = login(&store, "ghost", "pw1").unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn test_reset_password() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let username = reset_password(&mut store, &Contact::Phone("0901".into()), "fresh").unwrap();
        assert_eq!(username, "lan");
        assert!(login(&store, "lan", "fresh").is_ok());

        let err = reset_password(&mut store, &Contact::Email("who@x.vn".into()), "x").unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
    }

    #[test]
    fn test_update_profile_keeps_password() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let info = PersonalInfo {
            name: "Lan Nguyen".into(),
            dob: "1999-12-01".into(),
            email: "lan@y.vn".into(),
            phone: "0999".into(),
            role: Role::Freelance,
        };
        update_profile(&mut store, "lan", info).unwrap();
        let profile = store.get("lan").unwrap();
        assert_eq!(profile.password, "pw1");
        assert_eq!(profile.name, "Lan Nguyen");
        assert_eq!(profile.role, Role::Freelance);
    }

    #[test]
    fn test_update_profile_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let info = PersonalInfo {
            name: "".into(),
            dob: "1999-12-01".into(),
            email: "lan@y.vn".into(),
            phone: "0999".into(),
            role: Role::Freelance,
        };
        let err = update_profile(&mut store, "lan", info).unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Validation));
        assert_eq!(store.get("lan").unwrap().email, "lan@x.vn");
    }
}
