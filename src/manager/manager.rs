use std::cell::{
    RefCell,
    RefMut
};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use super::managererror::ManagerError;
use super::namedobject::NamedJsonObject;

pub trait IManager<V, S>
where
    V: Clone
{
    fn map(&self) -> RefMut<'_, HashMap<String, V>>;

    fn insert_obj_from_json(&self, json_value: serde_json::Value, supports: &S) -> Result<(), ManagerError>;

    fn get(&self, name: &str) -> Result<V, ManagerError> {
        self.map()
            .get(name)
            .cloned()
            .ok_or_else(|| ManagerError::map_elem_not_found(name))
    }

    /// Registered names in sorted order.
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map().keys().cloned().collect();
        names.sort();
        names
    }

    fn insert_obj_from_json_vec(&self, json_vec: &[serde_json::Value], supports: &S) -> Result<(), ManagerError> {
        for j in json_vec.iter() {
            self.insert_obj_from_json(j.clone(), supports)?;
        }
        Ok(())
    }

    fn from_reader(&self, file_path: impl AsRef<Path>, supports: &S) -> Result<(), ManagerError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_value: serde_json::Value = serde_json::from_reader(reader)?;
        if json_value.is_array() {
            let json_array: Vec<serde_json::Value> = ManagerError::from_json_or_json_parse_error(json_value)?;
            self.insert_obj_from_json_vec(&json_array, supports)
        } else {
            self.insert_obj_from_json(json_value, supports)
        }
    }
}

pub struct Manager<V> {
    map_cell: RefCell<HashMap<String, V>>,
    get_obj_from_json: fn(serde_json::Value) -> Result<V, ManagerError>
}

impl<V> Manager<V>
where
    V: Clone
{
    pub fn new(get_obj_from_json: fn(serde_json::Value) -> Result<V, ManagerError>) -> Manager<V> {
        Manager {
            map_cell: RefCell::new(HashMap::new()),
            get_obj_from_json
        }
    }

    pub fn insert(&self, name: impl Into<String>, value: V) {
        self.map().insert(name.into(), value);
    }
}

impl<V> IManager<V, ()> for Manager<V>
where
    V: Clone
{
    fn map(&self) -> RefMut<'_, HashMap<String, V>> {
        self.map_cell.borrow_mut()
    }

    fn insert_obj_from_json(&self, json_value: serde_json::Value, _supports: &()) -> Result<(), ManagerError> {
        let named_object: NamedJsonObject = ManagerError::from_json_or_json_parse_error(json_value.clone())?;
        let v = (self.get_obj_from_json)(json_value)?;
        debug!(name = named_object.name(), "registered object");
        self.map().insert(named_object.name().to_owned(), v);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse_number(json_value: serde_json::Value) -> Result<f64, ManagerError> {
        json_value
            .get("value")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| ManagerError::json_missing_field("value"))
    }

    #[test]
    fn test_insert_and_get() {
        let manager = Manager::new(parse_number);
        manager
            .insert_obj_from_json_vec(
                &[json!({"name": "b", "value": 2.0}), json!({"name": "a", "value": 1.0})],
                &(),
            )
            .unwrap();
        assert_eq!(manager.get("a").unwrap(), 1.0);
        assert_eq!(manager.names(), vec!["a".to_owned(), "b".to_owned()]);
        assert!(matches!(manager.get("c"), Err(ManagerError::NameNotFoundError(_))));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let manager = Manager::new(parse_number);
        let result = manager.insert_obj_from_json(json!({"value": 2.0}), &());
        assert!(matches!(result, Err(ManagerError::JsonParseError(_))));
    }
}
