use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use fablecraft_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{
        ImageProviders, ObjectStorageClient, OpenAiClient, Providers, RendererClient,
        RunwareClient,
    },
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{JwtService, RetryPolicy},
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
    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to load configuration")?;

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(&config.jwt);

    // 外部供应商
    let retry = RetryPolicy::from_config(&config.retry);
    let openai = Arc::new(OpenAiClient::new(config.openai.clone(), retry.clone()));
    let runware = Arc::new(RunwareClient::new(config.runware.clone(), retry.clone()));
    let providers = Providers {
        text: openai.clone(),
        images: ImageProviders::new(openai.clone(), runware),
        speech: openai,
        renderer: Arc::new(RendererClient::new(config.renderer.clone(), retry)),
        storage: Arc::new(ObjectStorageClient::new(config.storage.clone())),
    };

    // 创建服务
    let account_service = AccountService::new(pool.clone());
    let tier_service = TierService::new(pool.clone());
    let credit_service = CreditService::new(pool.clone(), config.credits.clone());
    let settings_service = SettingsService::new(pool.clone(), config.image_provider);
    let story_service =
        StoryService::new(pool.clone(), credit_service.clone(), providers.clone());
    let translation_service =
        TranslationService::new(pool.clone(), credit_service.clone(), providers.clone());
    let media_service = MediaService::new(
        pool.clone(),
        credit_service.clone(),
        settings_service.clone(),
        providers,
        config.storage.clone(),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let cors_origins = config.server.cors_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&cors_origins))
            .wrap(Logger::default())
            .app_data(web::Data::new(account_service.clone()))
            .app_data(web::Data::new(tier_service.clone()))
            .app_data(web::Data::new(credit_service.clone()))
            .app_data(web::Data::new(settings_service.clone()))
            .app_data(web::Data::new(story_service.clone()))
            .app_data(web::Data::new(translation_service.clone()))
            .app_data(web::Data::new(media_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::tier_config)
                    .configure(handlers::account_config)
                    .configure(handlers::story_config)
                    .configure(handlers::media_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
