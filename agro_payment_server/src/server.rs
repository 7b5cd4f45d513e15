use std::{sync::Arc, time::Duration};

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, QueryPayloadError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use agro_payment_engine::{notify::LateBoundNotifier, PaymentFlowApi, SqliteDatabase};
use log::*;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{BotOptions, ServerConfig},
    errors::ServerError,
    routes::configure_routes,
    sessions::SessionBackend,
    sweeper::start_subscription_sweeper,
    telegram::{start_notifier_binder, TelegramBotClient, TelegramNotifier},
};

/// The workflow engine as the server runs it.
pub type AgroFlowApi = PaymentFlowApi<SqliteDatabase, SessionBackend, LateBoundNotifier<TelegramNotifier>>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let mut db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database is ready at {}", db.url());
    let sessions =
        SessionBackend::from_config(&config.sessions).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let notifier = LateBoundNotifier::<TelegramNotifier>::new();
    let api = Arc::new(PaymentFlowApi::new(db.clone(), sessions, notifier.clone(), config.flow.clone()));

    let token = CancellationToken::new();
    let admin_chat = config.telegram.admin_id.map(|id| id.value());
    let binder = match TelegramBotClient::new(&config.telegram.api_url, config.telegram.bot_token.clone()) {
        Ok(client) => Some(start_notifier_binder(client, admin_chat, notifier, token.clone())),
        Err(e) => {
            error!("🚀️ The bot is disabled and no notifications will be sent. {e}");
            None
        },
    };
    let sweeper = start_subscription_sweeper(Arc::clone(&api), config.sweep_interval, token.clone());

    let options = BotOptions::from(&config.telegram);
    let srv = create_server_instance(&config, web::Data::from(api), options)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ Server has stopped. Waiting for background tasks to finish");
    token.cancel();
    for (name, task) in [("notifier binder", binder), ("sweeper", Some(sweeper))] {
        let Some(task) = task else { continue };
        if let Err(e) = task.await {
            warn!("🚀️ The {name} task did not exit cleanly. {e}");
        }
    }
    if let Err(e) = db.close().await {
        warn!("🚀️ Could not close the database cleanly. {e}");
    }
    result
}

/// Builds the HTTP server. actix handles SIGINT and SIGTERM itself, giving in-flight requests up to
/// `config.shutdown_grace` to complete.
pub fn create_server_instance(
    config: &ServerConfig,
    api: web::Data<AgroFlowApi>,
    options: BotOptions,
) -> Result<Server, ServerError> {
    let options = web::Data::new(options);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("agro::access_log"))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(api.clone())
            .app_data(options.clone())
            .configure(configure_routes::<SqliteDatabase, SessionBackend, LateBoundNotifier<TelegramNotifier>>)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .shutdown_timeout(config.shutdown_grace.as_secs())
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed bodies are answered with the same JSON error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| -> Error {
        debug!("💻️ Could not read the request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| -> Error {
        debug!("💻️ Could not read the query string. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}
