use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::error::ProxyError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("ingredients must not be empty")] EmptyIngredients,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ingredients: String, // free text, sent exactly as typed
}

impl GenerationRequest {
    pub fn new(ingredients: impl Into<String>) -> Result<Self, InputError> {
        let ingredients = ingredients.into();
        if ingredients.trim().is_empty() {
            return Err(InputError::EmptyIngredients);
        }
        Ok(Self { ingredients })
    }
}

/// What the generation backend hands back on success. Field values are opaque
/// to this crate and travel to the client unchanged.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub roast: String,
    pub recipe_name: String,
    pub ingredients_list: Vec<String>,
    /// Ordered steps; step N assumes step N-1 was read first.
    pub instructions: Vec<String>,
}

impl GenerationResult {
    /// Parse a backend success body. Missing or mistyped fields and blank
    /// `roast`/`recipe_name` are rejected; empty lists are fine.
    pub fn decode(body: &[u8]) -> Result<Self, ProxyError> {
        let result: GenerationResult = serde_json::from_slice(body)
            .map_err(|e| ProxyError::Validation(format!("malformed generation result: {}", e)))?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), ProxyError> {
        if self.roast.trim().is_empty() {
            return Err(ProxyError::Validation("field `roast` is empty".into()));
        }
        if self.recipe_name.trim().is_empty() {
            return Err(ProxyError::Validation("field `recipe_name` is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default)]
    pub details: String,
}
