use serde::{
    Deserialize,
    Serialize
};

/// The `name` field every managed JSON object carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedJsonObject {
    name: String
}

impl NamedJsonObject {
    pub fn new(name: impl Into<String>) -> NamedJsonObject {
        NamedJsonObject { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
