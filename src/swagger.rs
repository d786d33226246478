use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::user::get_referrals,
        handlers::user_transaction::list_transactions,
        handlers::user_transaction::total_earn,
        handlers::wheel::get_wheel,
        handlers::wheel::count_tickets,
        handlers::wheel::buy_tickets,
        handlers::wheel::play,
        handlers::ticket::list_tickets,
        handlers::swap::create_swap,
        handlers::swap::after_swap,
        handlers::swap::resign,
        handlers::swap::list_swaps,
        handlers::metadata::get_swap_setting,
        handlers::notification::list_notifications,
        handlers::notification::unread_count,
        handlers::notification::mark_read,
        handlers::notification::mark_all_read,
        handlers::notification::delete_notification,
        handlers::app::list_apps,
        handlers::app::get_app,
        handlers::app::open_app,
        handlers::tag::list_tags,
        handlers::tag::get_tag,
        handlers::admin::user::list_users,
        handlers::admin::user::get_user,
        handlers::admin::user::create_user,
        handlers::admin::user::update_user,
        handlers::admin::user::delete_users,
        handlers::admin::user::ban_users,
        handlers::admin::user::unban_users,
        handlers::admin::role::list_roles,
        handlers::admin::role::get_role,
        handlers::admin::role::create_role,
        handlers::admin::role::update_role,
        handlers::admin::role::delete_role,
        handlers::admin::role::list_permissions,
        handlers::admin::wheel::list_wheels,
        handlers::admin::wheel::get_wheel,
        handlers::admin::wheel::create_wheel,
        handlers::admin::wheel::update_wheel,
        handlers::admin::ticket::list_tickets,
        handlers::admin::ticket::grant_tickets,
        handlers::admin::ticket::update_ticket_status,
        handlers::admin::swap::list_swaps,
        handlers::admin::swap::rollback_swap,
        handlers::admin::metadata::list_metadata,
        handlers::admin::metadata::update_metadata,
        handlers::admin::notification::broadcast_notification,
        handlers::admin::app::list_apps,
        handlers::admin::app::count_apps_by_status,
        handlers::admin::app::get_app,
        handlers::admin::app::create_app,
        handlers::admin::app::update_app,
        handlers::admin::app::delete_apps,
        handlers::admin::tag::create_tag,
        handlers::admin::tag::update_tag,
        handlers::admin::tag::delete_tags,
        handlers::admin::transaction::list_all_transactions,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            UserResponse,
            UserStatus,
            UpdateMeRequest,
            CreateUserRequest,
            UpdateUserRequest,
            ReferralResponse,
            RoleType,
            RoleResponse,
            CreateRoleRequest,
            UpdateRoleRequest,
            PermissionCatalogResponse,
            UserTransaction,
            TransactionType,
            TransactionAction,
            Currency,
            TotalEarnResponse,
            WheelResponse,
            PrizeResponse,
            PrizeType,
            PrizeCategory,
            AdminWheelResponse,
            AdminPrizeResponse,
            PrizeInput,
            CreateWheelRequest,
            UpdateWheelRequest,
            BuyTicketRequest,
            BuyTicketResponse,
            PlayRequest,
            PlayResponse,
            SpinResult,
            CountTicketResponse,
            UserWheelTicket,
            TicketStatus,
            TicketType,
            GrantTicketsRequest,
            UpdateTicketStatusRequest,
            UserSwap,
            SwapStatus,
            SwapType,
            CreateSwapRequest,
            AfterSwapRequest,
            AfterSwapResponse,
            SwapSignatureResponse,
            Metadata,
            MetadataType,
            UpdateMetadataRequest,
            Notification,
            NotificationStatus,
            CreateNotificationRequest,
            UnreadCountResponse,
            AppResponse,
            AppStatus,
            AppStatusCount,
            CreateAppRequest,
            UpdateAppRequest,
            OpenAppResponse,
            TagResponse,
            CreateTagRequest,
            UpdateTagRequest,
            IdsRequest,
            AffectedResponse,
            PageMeta,
            SortDirection,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User profile and referral API"),
        (name = "user-transaction", description = "Point and TON ledger API"),
        (name = "ticket", description = "Wheel ticket API"),
        (name = "wheel", description = "Lucky wheel API"),
        (name = "swap", description = "Point to jetton swap API"),
        (name = "metadata", description = "Public settings API"),
        (name = "notification", description = "User notification API"),
        (name = "app", description = "App catalogue API"),
        (name = "tag", description = "App tag API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "PointHub Backend API",
        version = "1.0.0",
        description = "PointHub Backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
