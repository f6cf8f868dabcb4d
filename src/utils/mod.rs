pub mod jwt;
pub mod month;
pub mod prompt;
pub mod retry;

pub use jwt::*;
pub use month::{current_month_key, month_key};
pub use retry::RetryPolicy;
