//! Decides which endpoint an execution goes to and what it carries.

use tracing::info;

use crate::backend::Backend;
use crate::config::{EXECUTE_BATCH_PATH, EXECUTE_CURL_PATH, MIN_ITERATIONS};
use crate::error::BenchError;
use crate::model::{ExecuteOutcome, ExecutionRequest, VariableMap, VariablesPayload};
use crate::state::FormState;
use crate::variables::{kv_rows_to_map, parse_variables_json, ActiveVariableSource, VariableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ExecuteCurl,
    ExecuteBatch,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ExecuteCurl => EXECUTE_CURL_PATH,
            Endpoint::ExecuteBatch => EXECUTE_BATCH_PATH,
        }
    }
}

/// How the backend will expand the request into runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One run with one mapping.
    Single,
    /// One run per element of a variable sequence.
    VariableList,
    /// One run per spreadsheet row, capped by `iterations`.
    ExcelRows,
    /// The same mapping repeated `iterations` times.
    Repeat,
    /// A one-element sequence run once.
    Once,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub endpoint: Endpoint,
    pub mode: RunMode,
    pub request: ExecutionRequest,
}

fn require_curl(form: &FormState) -> Result<(), BenchError> {
    if form.curl_command.trim().is_empty() {
        return Err(BenchError::EmptyCurlCommand);
    }
    Ok(())
}

/// Plan a single execution from the applied store. A non-empty sequence
/// contributes only its first element.
pub fn plan_single(form: &FormState, store: &VariableStore) -> Result<Dispatch, BenchError> {
    require_curl(form)?;

    let variables = match store.current() {
        VariablesPayload::List(items) if !items.is_empty() => VariablesPayload::Map(items[0].clone()),
        other => other.clone(),
    };

    Ok(Dispatch {
        endpoint: Endpoint::ExecuteCurl,
        mode: RunMode::Single,
        request: ExecutionRequest {
            curl_command: form.curl_command.clone(),
            variables: Some(variables),
            assertions: form.assertions.collect(),
            iterations: None,
            excel_file: None,
            use_python: Some(false),
        },
    })
}

/// Re-read variables from the live input of the active source. The
/// spreadsheet source has no inline variables and falls back to the store.
pub fn derive_variables(
    form: &FormState,
    store: &VariableStore,
    source: ActiveVariableSource,
) -> Result<VariablesPayload, BenchError> {
    match source {
        ActiveVariableSource::Json => {
            if form.json_text.trim().is_empty() {
                return Ok(VariablesPayload::Map(VariableMap::new()));
            }
            parse_variables_json(&form.json_text)
                .map_err(|e| BenchError::InvalidVariablesJson(e.to_string()))
        }
        ActiveVariableSource::Kv => Ok(VariablesPayload::Map(kv_rows_to_map(&form.kv_rows))),
        ActiveVariableSource::Excel => Ok(store.current().clone()),
    }
}

/// Plan a batch execution. Rules, first match wins:
/// 1. non-empty variable sequence: `/execute_curl` with the whole sequence;
/// 2. uploaded spreadsheet and the spreadsheet source active: `/execute_batch`;
/// 3. non-empty mapping and more than one iteration: `/execute_curl` repeating it;
/// 4. otherwise `/execute_curl` with a one-element sequence.
pub fn plan_batch(
    form: &FormState,
    store: &VariableStore,
    source: ActiveVariableSource,
) -> Result<Dispatch, BenchError> {
    require_curl(form)?;

    let local = derive_variables(form, store, source)?;
    let iterations = form.iterations.max(MIN_ITERATIONS);
    let assertions = form.assertions.collect();

    let base = ExecutionRequest {
        curl_command: form.curl_command.clone(),
        variables: None,
        assertions,
        iterations: Some(iterations),
        excel_file: None,
        use_python: None,
    };

    if let VariablesPayload::List(items) = &local {
        if !items.is_empty() {
            return Ok(Dispatch {
                endpoint: Endpoint::ExecuteCurl,
                mode: RunMode::VariableList,
                request: ExecutionRequest {
                    variables: Some(VariablesPayload::List(items.clone())),
                    ..base
                },
            });
        }
    }

    if source == ActiveVariableSource::Excel {
        if let Some(excel) = store.excel() {
            return Ok(Dispatch {
                endpoint: Endpoint::ExecuteBatch,
                mode: RunMode::ExcelRows,
                request: ExecutionRequest {
                    excel_file: Some(excel.as_str().to_string()),
                    ..base
                },
            });
        }
    }

    let map = match local {
        VariablesPayload::Map(map) => map,
        VariablesPayload::List(_) => VariableMap::new(),
    };
    let mode = if !map.is_empty() && iterations > 1 {
        RunMode::Repeat
    } else {
        RunMode::Once
    };

    Ok(Dispatch {
        endpoint: Endpoint::ExecuteCurl,
        mode,
        request: ExecutionRequest {
            variables: Some(VariablesPayload::List(vec![map])),
            ..base
        },
    })
}

/// Issue a planned dispatch. Spreadsheet batches always come back as batch
/// results.
pub async fn send<B: Backend + ?Sized>(
    backend: &B,
    dispatch: &Dispatch,
) -> Result<ExecuteOutcome, BenchError> {
    info!(
        "Dispatching {:?} run to {} ({} assertions)",
        dispatch.mode,
        dispatch.endpoint.path(),
        dispatch.request.assertions.len()
    );
    match dispatch.endpoint {
        Endpoint::ExecuteCurl => backend.execute_curl(&dispatch.request).await,
        Endpoint::ExecuteBatch => backend
            .execute_batch(&dispatch.request)
            .await
            .map(ExecuteOutcome::Batch),
    }
}
