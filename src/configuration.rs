use std::cell::{
    RefCell,
    RefMut
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::manager::manager::{
    IManager,
    Manager
};
use crate::manager::managererror::ManagerError;
use crate::math::curve::curve::Curve;
use crate::math::curve::curvemanager::CurveManager;

#[derive(Deserialize)]
struct ConfigurationJsonProp {
    curves: Vec<serde_json::Value>
}

pub struct Configuration {
    curve_manager_cell: RefCell<Manager<Arc<dyn Curve>>>
}

impl Configuration {
    pub fn new() -> Configuration {
        Configuration {
            curve_manager_cell: RefCell::new(CurveManager::new())
        }
    }

    pub fn curve_manager(&self) -> RefMut<'_, Manager<Arc<dyn Curve>>> {
        self.curve_manager_cell.borrow_mut()
    }

    pub fn from_value(&self, json_value: serde_json::Value) -> Result<(), ManagerError> {
        let json_prop: ConfigurationJsonProp = ManagerError::from_json_or_json_parse_error(json_value)?;
        self.load(json_prop)
    }

    pub fn from_reader(&self, file_path: impl AsRef<Path>) -> Result<(), ManagerError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_prop: ConfigurationJsonProp = serde_json::from_reader(reader)?;
        self.load(json_prop)
    }

    fn load(&self, json_prop: ConfigurationJsonProp) -> Result<(), ManagerError> {
        let _empty_support = ();
        let curve_manager = self.curve_manager_cell.borrow_mut();
        curve_manager.insert_obj_from_json_vec(&json_prop.curves, &_empty_support)?;
        info!(curves = json_prop.curves.len(), "loaded curve configuration");
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_value() {
        let config = Configuration::new();
        config
            .from_value(json!({
                "curves": [
                    {"name": "pulse", "type": "gaussian", "mean": 5.0, "stdev": 2.0},
                    {"name": "wave", "type": "sine", "amplitude": 3.0}
                ]
            }))
            .unwrap();
        let manager = config.curve_manager();
        assert_eq!(manager.names(), vec!["pulse".to_owned(), "wave".to_owned()]);
        assert_eq!(manager.get("pulse").unwrap().start(), 3.0);
    }

    #[test]
    fn test_missing_file() {
        let config = Configuration::new();
        let result = config.from_reader("/nonexistent/curves.json");
        assert!(matches!(result, Err(ManagerError::IOError(_))));
    }

    #[test]
    fn test_bad_curve_aborts_load() {
        let config = Configuration::new();
        let result = config.from_value(json!({
            "curves": [{"name": "bad", "type": "gaussian", "mean": 0.0, "stdev": 0.0}]
        }));
        assert!(matches!(result, Err(ManagerError::CurveError(_))));
    }
}
