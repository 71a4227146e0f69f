pub mod prelude;

pub mod items;
pub mod requests;
pub mod users;
