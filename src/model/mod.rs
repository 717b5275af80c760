//! Types that represent the core data model, such as `Transaction` and `Profile`.
mod amount;
mod category;
mod profile;
mod summary;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{categories, category_breakdown, CategoryTotal, DEFAULT_CATEGORY};
pub use profile::{PersonalInfo, Profile, Role};
pub(crate) use profile::{validate_email, validate_phone};
pub use summary::{Stats, Summary};
pub use transaction::{parse_date, today, Kind, KindFilter, Transaction, DATE_FORMAT};
