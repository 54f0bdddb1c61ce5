use serde_json::Value;

use crate::models::User;

/// Records an audit entry as a structured event on the `audit` target.
pub fn log_audit(actor: Option<&User>, action: &str, resource: Option<&str>, metadata: Option<Value>) {
    let actor = actor.map(|u| u.id.as_str()).unwrap_or("-");
    let resource = resource.unwrap_or("-");
    let metadata = metadata.unwrap_or(Value::Null);
    tracing::info!(
        target: "audit",
        actor,
        action,
        resource,
        metadata = %metadata,
        "audit"
    );
}
