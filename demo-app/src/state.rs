use crate::services::UserService;

#[derive(Clone, Default)]
pub struct AppState {
    pub users: UserService,
}
