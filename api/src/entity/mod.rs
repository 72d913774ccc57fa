//! SeaORM entity definitions
//!
//! Table shapes mirror the `medshare-migration` schema.

pub mod prelude;

pub mod model_downloads;
pub mod model_likes;
pub mod models;
pub mod users;
