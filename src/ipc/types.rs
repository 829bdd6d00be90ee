use crate::model::Role;
use crate::store::Store;
use crate::summary::SummaryGenerator;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: Store,
    pub generator: Box<dyn SummaryGenerator>,
    pub role: Option<Role>,
}

impl AppState {
    pub fn new(store: Store, generator: Box<dyn SummaryGenerator>) -> Self {
        Self {
            store,
            generator,
            role: None,
        }
    }
}
