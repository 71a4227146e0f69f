mod admin;
mod reset;
mod users;

pub use admin::cmd_create_admin;
pub use reset::cmd_reset_db;
pub use users::cmd_list_users;
