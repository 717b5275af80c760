//! Profile commands. Each one checks the username and password first.

use crate::accounts;
use crate::args::{Credentials, ExportFormat, ProfileExportArgs, ProfileUpdateArgs};
use crate::commands::Out;
use crate::model::{PersonalInfo, Profile};
use crate::{Config, Result};

/// Shows the personal details of the logged in user. The password is not included.
pub fn profile_show(config: &Config, credentials: Credentials) -> Result<Out<PersonalInfo>> {
    let store = config.profile_store();
    let profile = accounts::login(&store, &credentials.username, &credentials.password)?;
    let info = personal_info(profile);
    let message = format!(
        "Username:      {}\nName:          {}\nDate of birth: {}\nEmail:         {}\n\
         Phone:         {}\nRole:          {}",
        credentials.username,
        info.name,
        info.dob,
        info.email,
        info.phone,
        info.role.display_label()
    );
    Ok(Out::new(message, info))
}

/// Replaces the personal details of the logged in user.
///
/// # Errors
///
/// - Returns an `ErrorType::Validation` error if the name is empty, the date of birth is not
///   `YYYY-MM-DD`, the email has no `@` or the phone is not all digits.
pub fn profile_update(config: &Config, args: ProfileUpdateArgs) -> Result<Out<PersonalInfo>> {
    let mut store = config.profile_store();
    let username = args.credentials.username;
    accounts::login(&store, &username, &args.credentials.password)?;
    let info = PersonalInfo {
        name: args.name,
        dob: args.dob,
        email: args.email,
        phone: args.phone,
        role: args.role,
    };
    accounts::update_profile(&mut store, &username, info)?;
    let updated = store.get(&username).map(personal_info);
    let message = format!("Updated the profile of '{username}'");
    Ok(match updated {
        Some(info) => Out::new(message, info),
        None => Out::new_message(message),
    })
}

/// Writes the personal details of the logged in user to a file, without the password.
pub fn profile_export(config: &Config, args: ProfileExportArgs) -> Result<Out<()>> {
    let store = config.profile_store();
    let username = &args.credentials.username;
    accounts::login(&store, username, &args.credentials.password)?;
    match args.format {
        ExportFormat::Csv => store.export_csv(username, &args.path)?,
        ExportFormat::Json => store.export_json(username, &args.path)?,
    }
    Ok(format!(
        "Exported the profile of '{username}' to {}",
        args.path.display()
    )
    .into())
}

fn personal_info(profile: &Profile) -> PersonalInfo {
    PersonalInfo {
        name: profile.name.clone(),
        dob: profile.dob.clone(),
        email: profile.email.clone(),
        phone: profile.phone.clone(),
        role: profile.role,
    }
}
