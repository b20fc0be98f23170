use mongodb::Database;
use std::sync::Arc;
use voluntry_config::Settings;
use voluntry_services::{ActivityService, AuthService, dao::user::UserDao};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub activities: Arc<ActivityService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let activities = Arc::new(ActivityService::new(&db));

        Self {
            db,
            settings,
            auth,
            users,
            activities,
        }
    }
}
