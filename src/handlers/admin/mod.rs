//! 管理端接口，统一挂在 /admin 下，每个接口先做资源权限检查

pub mod app;
pub mod metadata;
pub mod notification;
pub mod role;
pub mod swap;
pub mod tag;
pub mod ticket;
pub mod transaction;
pub mod user;
pub mod wheel;

use actix_web::web;

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .configure(app::app_config)
            .configure(metadata::metadata_config)
            .configure(notification::notification_config)
            .configure(role::role_config)
            .configure(swap::swap_config)
            .configure(tag::tag_config)
            .configure(ticket::ticket_config)
            .configure(transaction::transaction_config)
            .configure(user::user_config)
            .configure(wheel::wheel_config),
    );
}
