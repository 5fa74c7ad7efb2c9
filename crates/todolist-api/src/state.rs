use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<todolist_db::Database>,
}
