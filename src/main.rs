use std::io::Error;
use std::sync::Arc;
use std::time::Duration;

use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use sqlx::postgres::PgPoolOptions;
use tokio::main;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    application::{
        services::{
            jwt::JwtServiceConfig, registry::DispatchRegistry, transport::TransportGateway,
        },
        usecases::{
            cancel_dispatch::CancelDispatchUseCase, get_dispatch_status::GetDispatchStatusUseCase,
            get_settings::GetSettingsUseCase, list_deliveries::ListDeliveriesUseCase,
            list_groups::ListGroupsUseCase, list_instances::ListInstancesUseCase,
            register_instance::RegisterInstanceUseCase, start_dispatch::StartDispatchUseCase,
            update_settings::UpdateSettingsUseCase,
        },
    },
    config::Config,
    domain::repositories::{DeliveryLogRepository, InstanceRepository, SettingsRepository},
    infrastructure::{
        messaging::evolution::EvolutionClient,
        repositories::{
            in_memory::{
                InMemoryDeliveryLogRepository, InMemoryInstanceRepository,
                InMemorySettingsRepository,
            },
            postgres::{
                PostgresDeliveryLogRepository, PostgresInstanceRepository,
                PostgresSettingsRepository,
            },
        },
    },
    presentation::http::endpoints::{
        dispatches::DispatchesEndpoints, groups::GroupsEndpoints, health::HealthEndpoints,
        instances::InstancesEndpoints, root::ApiState, settings::SettingsEndpoints,
    },
};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::try_parse().map_err(Error::other)?;
    let state = build_state(&config).await.map_err(Error::other)?;

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);
    info!(url = %server_url, "starting server");

    let api_service = OpenApiService::new(
        (
            HealthEndpoints,
            DispatchesEndpoints::new(state.clone()),
            GroupsEndpoints::new(state.clone()),
            InstancesEndpoints::new(state.clone()),
            SettingsEndpoints::new(state),
        ),
        "Broadcast API",
        "0.1.0",
    )
    .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    Server::new(TcpListener::bind(format!("localhost:{}", config.port)))
        .run(app)
        .await
}

async fn build_state(config: &Config) -> anyhow::Result<Arc<ApiState>> {
    let (instance_repo, settings_repo, log_repo): (
        Arc<dyn InstanceRepository>,
        Arc<dyn SettingsRepository>,
        Arc<dyn DeliveryLogRepository>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            sqlx::migrate!().run(&pool).await?;
            info!("using postgres repositories");
            (
                PostgresInstanceRepository::new(pool.clone()),
                PostgresSettingsRepository::new(pool.clone()),
                PostgresDeliveryLogRepository::new(pool),
            )
        }
        None => {
            info!("no DATABASE_URL set, using in-memory repositories");
            (
                Arc::new(InMemoryInstanceRepository::new()),
                Arc::new(InMemorySettingsRepository::new()),
                Arc::new(InMemoryDeliveryLogRepository::new()),
            )
        }
    };

    let gateway = TransportGateway::new(vec![EvolutionClient::new(
        config.evolution_api_url.clone(),
        config.evolution_api_key.clone(),
    )]);
    let registry = Arc::new(DispatchRegistry::new());
    let jwt_config = JwtServiceConfig {
        secret: config.jwt_secret.clone(),
        expiration: Duration::from_secs(60 * 60),
    };

    Ok(Arc::new(ApiState {
        start_dispatch_usecase: Arc::new(StartDispatchUseCase::new(
            instance_repo.clone(),
            settings_repo.clone(),
            log_repo.clone(),
            gateway.clone(),
            registry.clone(),
        )),
        cancel_dispatch_usecase: Arc::new(CancelDispatchUseCase::new(registry.clone())),
        dispatch_status_usecase: Arc::new(GetDispatchStatusUseCase::new(registry)),
        list_deliveries_usecase: Arc::new(ListDeliveriesUseCase::new(log_repo)),
        list_groups_usecase: Arc::new(ListGroupsUseCase::new(
            instance_repo.clone(),
            gateway.clone(),
        )),
        register_instance_usecase: Arc::new(RegisterInstanceUseCase::new(instance_repo.clone())),
        list_instances_usecase: Arc::new(ListInstancesUseCase::new(instance_repo)),
        get_settings_usecase: Arc::new(GetSettingsUseCase::new(settings_repo.clone())),
        update_settings_usecase: Arc::new(UpdateSettingsUseCase::new(settings_repo)),
        jwt_config,
    }))
}
