//! These structs provide the CLI interface for the ledger CLI.

use crate::model::{Amount, Kind, KindFilter, Role};
use crate::store::Contact;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A command-line tool for tracking personal income and expenses.
///
/// Transactions and user profiles are kept as JSON files in a ledger home directory, which you
/// create with the init command. Every change is written to disk immediately.
///
/// Passwords are stored in plain text. Do not reuse a real password here.
#[derive(Debug, Parser, Clone)]
#[command(name = "ledger", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory and its config file.
    ///
    /// This is the first command you should run. By default the ledger lives in
    /// $HOME/pocket-ledger; pass --ledger-home or set LEDGER_HOME to put it somewhere else.
    /// Running it again keeps the existing config.
    Init,
    /// Create a user account.
    Register(RegisterArgs),
    /// Check a username and password.
    Login(Credentials),
    /// Set a new password for the account registered with an email or phone number.
    ResetPassword(ResetPasswordArgs),
    /// Record a new income or expense.
    Add(AddArgs),
    /// Change fields of an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(IdArgs),
    /// Show one transaction.
    Show(IdArgs),
    /// List all transactions, newest first, with totals.
    List,
    /// List the transactions within a date range and of a given type, with totals.
    Search(FilterArgs),
    /// Show income, expense and balance totals, optionally for a date range and type.
    Summary(FilterArgs),
    /// Show where the money went: the largest expense categories and the income/expense split.
    Stats(RangeArgs),
    /// List the suggested categories.
    Categories(CategoriesArgs),
    /// Write every transaction to a CSV or JSON file.
    Export(ExportArgs),
    /// Show, edit or export your profile.
    Profile(ProfileArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where ledger data and configuration is held. Defaults to ~/pocket-ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `ledger register` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct RegisterArgs {
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub email: String,

    /// Digits only.
    #[arg(long)]
    pub phone: String,
}

/// A username and password, used by `login` and the `profile` commands.
#[derive(Debug, ClapArgs, Clone)]
pub struct Credentials {
    #[arg(long, short = 'u')]
    pub username: String,

    #[arg(long, short = 'p', env = "LEDGER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// (Not shown): Args for the `ledger reset-password` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct ResetPasswordArgs {
    /// The email address the account was registered with.
    #[arg(long, required_unless_present = "phone", conflicts_with = "phone")]
    pub email: Option<String>,

    /// The phone number the account was registered with.
    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub new_password: String,
}

impl ResetPasswordArgs {
    pub fn contact(&self) -> Option<Contact> {
        match (&self.email, &self.phone) {
            (Some(email), _) => Some(Contact::Email(email.trim().to_string())),
            (None, Some(phone)) => Some(Contact::Phone(phone.trim().to_string())),
            (None, None) => None,
        }
    }
}

/// (Not shown): Args for the `ledger add` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct AddArgs {
    /// income or expense
    #[arg(long = "type", value_enum)]
    pub kind: Kind,

    #[arg(long)]
    pub description: String,

    /// A positive amount, e.g. 45000 or 1,250.50
    #[arg(long)]
    pub amount: Amount,

    /// YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Defaults to Other. See the categories command for suggestions.
    #[arg(long)]
    pub category: Option<String>,
}

/// (Not shown): Args for the `ledger update` command. Fields that are not given keep their
/// current values.
#[derive(Debug, ClapArgs, Clone)]
pub struct UpdateArgs {
    pub id: u64,

    #[arg(long = "type", value_enum)]
    pub kind: Option<Kind>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub amount: Option<Amount>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct IdArgs {
    pub id: u64,
}

/// An inclusive date range. Either end may be left open.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct RangeArgs {
    /// First date to include, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,

    /// Last date to include, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, ClapArgs, Clone, Default)]
pub struct FilterArgs {
    #[clap(flatten)]
    pub range: RangeArgs,

    #[arg(long = "type", value_enum, default_value_t = KindFilter::All)]
    pub kind: KindFilter,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct CategoriesArgs {
    /// Only list the categories for this type.
    #[arg(long = "type", value_enum)]
    pub kind: Option<Kind>,
}

#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

/// (Not shown): Args for the `ledger export` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub format: ExportFormat,

    /// The file to write. It is overwritten if it exists.
    pub path: PathBuf,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileCommand,
}

impl ProfileArgs {
    pub fn new(command: ProfileCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ProfileCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Show your personal details.
    Show(Credentials),
    /// Replace your personal details. Every field is required.
    Update(ProfileUpdateArgs),
    /// Write your personal details, without the password, to a CSV or JSON file.
    Export(ProfileExportArgs),
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ProfileUpdateArgs {
    #[clap(flatten)]
    pub credentials: Credentials,

    #[arg(long)]
    pub name: String,

    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long, value_enum)]
    pub role: Role,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct ProfileExportArgs {
    #[clap(flatten)]
    pub credentials: Credentials,

    #[arg(value_enum)]
    pub format: ExportFormat,

    pub path: PathBuf,
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pocket-ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("pocket-ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
