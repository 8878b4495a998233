use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::redis::RedisClient;
use adapter::repository::auth::AuthRepositoryImpl;
use adapter::repository::event::EventRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::rsvp::RsvpRepositoryImpl;
use adapter::repository::user::UserRepositoryImpl;
use kernel::repository::auth::AuthRepository;
use kernel::repository::event::EventRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::rsvp::RsvpRepository;
use kernel::repository::user::UserRepository;
use kernel::service::rsvp::RsvpService;
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    event_repository: Arc<dyn EventRepository>,
    rsvp_repository: Arc<dyn RsvpRepository>,
    user_repository: Arc<dyn UserRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    rsvp_service: Arc<RsvpService>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, redis_client: Arc<RedisClient>, app_config: AppConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let event_repository = Arc::new(EventRepositoryImpl::new(pool.clone()));
        let rsvp_repository = Arc::new(RsvpRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let auth_repository = Arc::new(AuthRepositoryImpl::new(
            pool.clone(),
            redis_client.clone(),
            app_config.auth.ttl,
        ));
        Self::with_repositories(
            health_check_repository,
            event_repository,
            rsvp_repository,
            user_repository,
            auth_repository,
            app_config,
        )
    }

    // 具象リポジトリを差し替えて構築する。テストではインメモリ実装を
    // 注入してハンドラまでを通しで動かす
    pub fn with_repositories(
        health_check_repository: Arc<dyn HealthCheckRepository>,
        event_repository: Arc<dyn EventRepository>,
        rsvp_repository: Arc<dyn RsvpRepository>,
        user_repository: Arc<dyn UserRepository>,
        auth_repository: Arc<dyn AuthRepository>,
        app_config: AppConfig,
    ) -> Self {
        let rsvp_service = Arc::new(RsvpService::new(
            event_repository.clone(),
            rsvp_repository.clone(),
            user_repository.clone(),
            app_config.rsvp.open_delay_secs,
        ));
        Self {
            health_check_repository,
            event_repository,
            rsvp_repository,
            user_repository,
            auth_repository,
            rsvp_service,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn event_repository(&self) -> Arc<dyn EventRepository> {
        self.event_repository.clone()
    }

    pub fn rsvp_repository(&self) -> Arc<dyn RsvpRepository> {
        self.rsvp_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn rsvp_service(&self) -> Arc<RsvpService> {
        self.rsvp_service.clone()
    }
}
