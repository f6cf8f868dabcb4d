pub mod account;
pub mod admin;
pub mod health;
pub mod media;
pub mod stories;
pub mod tiers;

pub use account::account_config;
pub use admin::admin_config;
pub use health::health_config;
pub use media::media_config;
pub use stories::story_config;
pub use tiers::tier_config;
