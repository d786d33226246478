pub mod admin;
pub mod app;
pub mod auth;
pub mod metadata;
pub mod notification;
pub mod swap;
pub mod tag;
pub mod ticket;
pub mod user;
pub mod user_transaction;
pub mod wheel;

pub use admin::admin_config;
pub use app::app_config;
pub use auth::auth_config;
pub use metadata::metadata_config;
pub use notification::notification_config;
pub use swap::swap_config;
pub use tag::tag_config;
pub use ticket::ticket_config;
pub use user::user_config;
pub use user_transaction::user_transaction_config;
pub use wheel::wheel_config;
