pub mod app_settings;
pub mod media_assets;
pub mod profiles;
pub mod stories;
pub mod story_translations;
pub mod subscription_tiers;
pub mod usage_counters;

pub use app_settings as app_setting_entity;
pub use media_assets as media_asset_entity;
pub use profiles as profile_entity;
pub use stories as story_entity;
pub use story_translations as story_translation_entity;
pub use subscription_tiers as subscription_tier_entity;
pub use usage_counters as usage_counter_entity;

pub use app_settings::{IMAGE_PROVIDER_KEY, ImageProviderKind};
pub use media_assets::MediaKind;
