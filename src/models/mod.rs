pub mod account;
pub mod common;
pub mod credit;
pub mod media;
pub mod pagination;
pub mod story;
pub mod tier;

pub use account::*;
pub use common::*;
pub use credit::*;
pub use media::*;
pub use pagination::*;
pub use story::*;
pub use tier::*;
