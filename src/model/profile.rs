use crate::model::transaction::{parse_date, today, DATE_FORMAT};
use crate::Result;
use anyhow::{bail, ensure};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Who the ledger is kept for. The first variant is the default.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Pupil,
    Student,
    Family,
    Freelance,
    NonProfit,
}

serde_plain::derive_display_from_serialize!(Role);
serde_plain::derive_fromstr_from_deserialize!(Role);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Pupil,
        Role::Student,
        Role::Family,
        Role::Freelance,
        Role::NonProfit,
    ];

    pub fn display_label(self) -> &'static str {
        match self {
            Role::Pupil => "Pupil",
            Role::Student => "Student",
            Role::Family => "Family",
            Role::Freelance => "Freelance",
            Role::NonProfit => "Non-profit organization",
        }
    }

    /// Matches a display label, in English or as written by older Vietnamese-language files.
    pub fn from_label(label: &str) -> Option<Role> {
        let role = match label {
            "Pupil" | "Học sinh" => Role::Pupil,
            "Student" | "Sinh viên" => Role::Student,
            "Family" | "Gia đình" => Role::Family,
            "Freelance" => Role::Freelance,
            "Non-profit organization" | "Tổ chức phi lợi nhuận" => Role::NonProfit,
            _ => return None,
        };
        Some(role)
    }
}

/// One user's credentials and personal details, keyed by username in the users file.
///
/// The password is stored and compared as plain text. This is NOT a security design: anyone who
/// can read the users file can read every password.
///
/// Every field is present after loading; missing fields read as empty strings and an unknown or
/// missing role reads as the default role.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dob: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_role")]
    pub role: Role,
}

impl Profile {
    /// A freshly registered profile: no name, born today, a student.
    pub fn registered(
        password: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            password: password.into(),
            name: String::new(),
            dob: today().format(DATE_FORMAT).to_string(),
            email: email.into(),
            phone: phone.into(),
            role: Role::Student,
        }
    }
}

/// The editable personal details of a profile. The password is managed separately.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub dob: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
}

impl PersonalInfo {
    /// Trims the text fields and checks them: a name is required, `dob` must be `YYYY-MM-DD`,
    /// the email must contain `@` and the phone must be digits only.
    pub fn validated(self) -> Result<Self> {
        let info = Self {
            name: self.name.trim().to_string(),
            dob: self.dob.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            role: self.role,
        };
        ensure!(!info.name.is_empty(), "Name must not be empty");
        let dob = parse_date(&info.dob)?;
        validate_email(&info.email)?;
        validate_phone(&info.phone)?;
        Ok(Self {
            dob: dob.format(DATE_FORMAT).to_string(),
            ..info
        })
    }
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || !email.contains('@') {
        bail!("Invalid email address '{email}'");
    }
    Ok(())
}

pub(crate) fn validate_phone(phone: &str) -> Result<()> {
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid phone number '{phone}', expected digits only");
    }
    Ok(())
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_role<'de, D>(deserializer: D) -> std::result::Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let role = value.as_str().and_then(|s| {
        s.parse::<Role>()
            .ok()
            .or_else(|| Role::from_label(s.trim()))
    });
    Ok(role.unwrap_or_else(|| {
        warn!("Unknown role {value}, using {}", Role::default());
        Role::default()
    }))
}
