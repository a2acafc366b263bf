use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

use crate::error::ShapeError;

/// Deserialize with JSON-path context in error messages.
pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, ShapeError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ShapeError::new(format!("at JSON path {path} → {}", err.into_inner())))
        }
    }
}

/// The minimum top-level skeleton an export must have before we walk it.
#[derive(Debug, Deserialize)]
pub struct ExportHeader {
    #[allow(dead_code)]
    pub catalog: CatalogHeader,
}

#[derive(Debug, Deserialize)]
pub struct CatalogHeader {
    #[allow(dead_code)]
    pub tables: IgnoredAny,
}

pub fn check_header(value: &Value) -> Result<ExportHeader, ShapeError> {
    from_value_with_path::<ExportHeader>(value)
}
