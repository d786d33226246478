pub mod app;
pub mod auth;
pub mod common;
pub mod metadata;
pub mod notification;
pub mod pagination;
pub mod role;
pub mod swap;
pub mod tag;
pub mod ticket;
pub mod user;
pub mod user_transaction;
pub mod wheel;

pub use app::*;
pub use auth::*;
pub use common::*;
pub use metadata::*;
pub use notification::*;
pub use pagination::*;
pub use role::*;
pub use swap::*;
pub use tag::*;
pub use ticket::*;
pub use user::*;
pub use user_transaction::*;
pub use wheel::*;
