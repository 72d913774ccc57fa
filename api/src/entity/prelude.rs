pub use super::model_downloads::Entity as ModelDownloads;
pub use super::model_likes::Entity as ModelLikes;
pub use super::models::Entity as Models;
pub use super::users::Entity as Users;
