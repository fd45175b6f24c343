pub mod rate_limit;
pub mod session;
pub mod validation;

pub use rate_limit::RateLimiter;
pub use session::{ChatSession, SendError};
pub use validation::{ValidationError, sanitize, validate};
