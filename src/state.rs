use std::sync::Arc;

use crate::services::AssistantService;

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<AssistantService>,
}
