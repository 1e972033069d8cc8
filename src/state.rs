use crate::service::Notifier;
use std::sync::Arc;

pub struct AppState {
    pub notifier: Arc<Notifier>,
}
