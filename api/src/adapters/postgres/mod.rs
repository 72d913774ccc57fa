//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod engagement_repo;
pub mod model_repo;
pub mod user_repo;


pub use engagement_repo::PostgresEngagementRepository;
pub use model_repo::PostgresModelRepository;
pub use user_repo::PostgresUserRepository;
