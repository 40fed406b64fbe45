//! Validator construction and validation passes.

use crate::error::{Result, StrategyError};
use crate::options::ValidateOptions;
use crate::schema::Schema;
use formcheck_engine::{Engine, ErrorBag, ErrorMap, FormData, RuleSet};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Rules handed to the engine for one pass.
///
/// Always-active schemas and forced passes use every rule. Otherwise a gated
/// schema contributes only its activated fields. The schema is not modified;
/// use [`activate_all`](crate::activate_all) to enable everything for good.
pub fn effective_rules<E>(schema: &Schema<E>, force_active: bool) -> RuleSet {
    match schema {
        Schema::AlwaysActive(_) => schema.rules().clone(),
        Schema::Gated { .. } if force_active => schema.rules().clone(),
        Schema::Gated { active, .. } => active
            .iter()
            .filter_map(|field| {
                schema
                    .rules()
                    .get(field)
                    .map(|expression| (field.clone(), expression.clone()))
            })
            .collect(),
    }
}

/// Build a validator for `data` from the schema.
///
/// The schema's hook, if any, runs exactly once with the new instance before
/// it is returned. Engine construction and hook failures are returned as is.
pub fn create_validator<E: Engine>(
    data: &FormData,
    schema: &Schema<E>,
    force_active: bool,
) -> Result<E> {
    let rules = effective_rules(schema, force_active);
    debug!(rules = rules.len(), force_active, "create validator");

    let mut validator = E::build(data.clone(), rules, schema.messages().cloned())?;

    if let Some(hook) = schema.hook() {
        hook.call(&mut validator).map_err(StrategyError::Hook)?;
    }

    Ok(validator)
}

/// Shape a finished pass for client code.
fn client_errors(errors: &ErrorBag, options: ValidateOptions) -> ErrorMap {
    match options.key {
        Some(key) => {
            let mut merged = options.prev_errors;
            let field_errors = errors.get(&key);
            merged.insert(key, field_errors);
            merged
        }
        None => errors.all(),
    }
}

/// Run a client-side pass.
///
/// A whole-form pass (no `key`) forces every rule active. A single-field pass
/// respects the schema's activation state and returns `prev_errors` with the
/// field's entry replaced, set to an empty list when the field is valid.
/// Passing and failing data both resolve to `Ok`; `Err` means a fault.
pub async fn validate<E: Engine>(
    data: &FormData,
    schema: &Schema<E>,
    options: ValidateOptions,
) -> Result<ErrorMap> {
    let force_active = options.is_whole_form();
    let mut validator = create_validator(data, schema, force_active)?;

    let passed = validator.check_async().await?;
    debug!(
        passed,
        key = options.key.as_deref().unwrap_or("<form>"),
        "client validation finished"
    );

    Ok(client_errors(validator.errors(), options))
}

/// Callback flavour of [`validate`] for callback-driven UI code.
///
/// The validator is built before this returns, so construction and hook
/// failures surface here. The pass itself runs on a spawned task and
/// `callback` is invoked from that task, never from the caller's frame. An
/// engine fault during the pass skips the callback and is returned through the
/// handle.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn validate_with_callback<E, F>(
    data: &FormData,
    schema: &Schema<E>,
    options: ValidateOptions,
    callback: F,
) -> Result<JoinHandle<Result<()>>>
where
    E: Engine,
    F: FnOnce(ErrorMap) + Send + 'static,
{
    let force_active = options.is_whole_form();
    let mut validator = create_validator(data, schema, force_active)?;

    Ok(tokio::spawn(async move {
        match validator.check_async().await {
            Ok(passed) => {
                debug!(passed, "client validation finished");
                callback(client_errors(validator.errors(), options));
                Ok(())
            }
            Err(e) => {
                error!("Client validation failed: {}", e);
                Err(e.into())
            }
        }
    }))
}

/// Run a server-side pass over the whole submission.
///
/// Every rule is forced active whatever the schema's activation state.
/// Resolves to `Ok(())` when nothing failed, otherwise to
/// [`StrategyError::Validation`] carrying the complete error map.
pub async fn validate_server<E: Engine>(data: &FormData, schema: &Schema<E>) -> Result<()> {
    let mut validator = create_validator(data, schema, true)?;

    let passed = validator.check_async().await?;
    debug!(passed, "server validation finished");

    if passed {
        Ok(())
    } else {
        Err(StrategyError::validation(validator.errors().all()))
    }
}
