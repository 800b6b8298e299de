use napi::Result as NapiResult;
use napi_derive::napi;

use tax_optimizer_core::tax::{self, TaxComputationInput, TaxConfig, TaxOptimizationInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Slab tax
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_tax(input_json: String) -> NapiResult<String> {
    let input: TaxComputationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax::calculate_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn marginal_rate(input_json: String) -> NapiResult<String> {
    let input: TaxComputationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax::resolve_marginal_rate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

#[napi]
pub fn recommend_strategies(input_json: String) -> NapiResult<String> {
    let input: TaxOptimizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax::recommend_strategies(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimize_tax(input_json: String) -> NapiResult<String> {
    let input: TaxOptimizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax::optimize_tax(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn document_checklist(input_json: String) -> NapiResult<String> {
    let input: TaxOptimizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax::build_document_checklist(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_tax_config() -> NapiResult<String> {
    serde_json::to_string(&TaxConfig::default()).map_err(to_napi_error)
}
