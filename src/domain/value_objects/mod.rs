pub mod ignore_policy;
pub mod version_name;

pub use ignore_policy::IgnorePolicy;
pub use version_name::{VersionName, VersionNameError};
