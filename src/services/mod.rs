pub mod app_service;
pub mod auth_service;
pub mod authz_service;
pub mod ledger_service;
pub mod metadata_service;
pub mod notification_service;
pub mod referral_service;
pub mod seed_service;
pub mod swap_service;
pub mod tag_service;
pub mod ticket_service;
pub mod user_service;
pub mod wheel_service;

pub use app_service::*;
pub use auth_service::*;
pub use authz_service::*;
pub use ledger_service::*;
pub use metadata_service::*;
pub use notification_service::*;
pub use referral_service::*;
pub use seed_service::*;
pub use swap_service::*;
pub use tag_service::*;
pub use ticket_service::*;
pub use user_service::*;
pub use wheel_service::*;
