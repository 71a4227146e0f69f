pub mod role;
pub mod status;

pub use role::Role;
pub use status::{ItemStatus, RequestStatus, UnknownVariant};
