use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use pointhub_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::{JwtService, SwapSigner},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().context("Failed to load configuration")?;

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    // 运行数据库迁移（含角色与兑换默认配置）
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let signer = SwapSigner::from_config(&config.swap.signing_key)
        .context("Failed to load swap signing key")?;
    log::info!("Swap signer public key: {}", signer.public_key_hex());

    // 创建服务
    let authz_service = AuthzService::new(pool.clone());
    let ledger_service = LedgerService::new(pool.clone());
    let ticket_service = TicketService::new(pool.clone());
    let referral_service = ReferralService::new(pool.clone(), config.referral.clone());
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone(), referral_service.clone());
    let user_service = UserService::new(pool.clone(), authz_service.clone());
    let wheel_service = WheelService::new(pool.clone(), config.app.clone(), config.wheel.clone());
    let swap_service = SwapService::new(pool.clone(), config.swap.clone(), signer);
    let metadata_service = MetadataService::new(pool.clone());
    let notification_service = NotificationService::new(pool.clone());
    let app_service = AppService::new(pool.clone(), config.app.clone());
    let tag_service = TagService::new(pool.clone(), config.app.clone());

    let banned = authz_service
        .load_banned_users()
        .await
        .context("Failed to load banned users")?;
    log::info!("Loaded {banned} banned users");

    if let Err(e) = seed_super_admin(&pool, &config.seed).await {
        log::error!("Failed to seed super admin: {e:?}");
    }

    // 启动后台任务（兑换链上确认与过期结算）
    tasks::spawn_all(swap_service.clone(), &config.swap);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone(), authz_service.clone()))
            .app_data(web::Data::new(authz_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(ticket_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(wheel_service.clone()))
            .app_data(web::Data::new(swap_service.clone()))
            .app_data(web::Data::new(metadata_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(app_service.clone()))
            .app_data(web::Data::new(tag_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::user_config)
                    .configure(handlers::user_transaction_config)
                    .configure(handlers::wheel_config)
                    .configure(handlers::ticket_config)
                    .configure(handlers::swap_config)
                    .configure(handlers::metadata_config)
                    .configure(handlers::notification_config)
                    .configure(handlers::app_config)
                    .configure(handlers::tag_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
