pub mod token;
pub use token::{Claims, TokenError, TokenIssuer};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, RegisterUser};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{CreateUser, UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod item_service;
pub mod item_service_impl;
pub use item_service::{CreateItem, ItemError, ItemPatch, ItemService};
pub use item_service_impl::SeaOrmItemService;

pub mod request_service;
pub mod request_service_impl;
pub use request_service::{CreateRequest, RequestError, RequestPatch, RequestService};
pub use request_service_impl::SeaOrmRequestService;
