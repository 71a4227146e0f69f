pub use super::items::Entity as Items;
pub use super::requests::Entity as Requests;
pub use super::users::Entity as Users;
