// Zone catalog domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub kind: String,
}

impl Zone {
    pub fn new(id: String, name: String, kind: String) -> Self {
        Self { id, name, kind }
    }
}
