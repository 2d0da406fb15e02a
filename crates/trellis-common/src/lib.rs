pub mod errors;
pub mod id;
pub mod state;

pub use errors::{ConfigError, TrellisError};
pub use id::{new_correlation_id, WindowId};
pub use state::{CanonicalState, LanguageState, StatePatch};

pub type Result<T> = std::result::Result<T, TrellisError>;
