pub mod account_service;
pub mod credit_service;
pub mod media_service;
pub mod settings_service;
pub mod story_service;
pub mod tier_service;
pub mod translation_service;

pub use account_service::*;
pub use credit_service::*;
pub use media_service::*;
pub use settings_service::*;
pub use story_service::*;
pub use tier_service::*;
pub use translation_service::*;
