//! Sequential application of rendered DDL
//!
//! Statements run strictly in order and the first failure aborts the run,
//! carrying the step that failed. Nothing here attempts cleanup of
//! partially-applied steps; where the backend has transactional DDL, that
//! is what protects atomicity.

use std::sync::Arc;

use glot_core::{Connection, DiffStep, GlotError, Result};
use tracing::{debug, info};

use crate::ddl::ObjectRewrite;

/// Executes a rendered statement batch in order.
///
/// A mid-batch failure surfaces the zero-based statement index; statements
/// before it stay applied.
pub async fn apply_statements(
    connection: &Arc<dyn Connection>,
    statements: &[String],
) -> Result<()> {
    for (index, statement) in statements.iter().enumerate() {
        debug!(index, statement, "applying statement");
        execute_step(connection, DiffStep::Statement(index), statement).await?;
    }
    Ok(())
}

/// Executes the four steps of an object rewrite in order.
///
/// Creating the new definition under its temporary name validates that it
/// compiles before the original is touched. A failure reports which step
/// the rewrite was on, so the caller knows whether the original still
/// exists.
pub async fn apply_rewrite(
    connection: &Arc<dyn Connection>,
    rewrite: &ObjectRewrite,
) -> Result<()> {
    info!(object = %rewrite.object_name, "applying object rewrite");
    for (step, statement) in rewrite.steps() {
        debug!(%step, statement, "applying rewrite step");
        execute_step(connection, step, statement).await?;
    }
    Ok(())
}

async fn execute_step(
    connection: &Arc<dyn Connection>,
    step: DiffStep,
    statement: &str,
) -> Result<()> {
    connection
        .execute(statement, &[])
        .await
        .map_err(|err| GlotError::DiffApplication {
            step,
            message: err.to_string(),
        })?;
    Ok(())
}
