//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_blender;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if no cassette is configured or it has no more
/// interactions for the port/method pair.
pub(crate) fn next_output(
    replayer: Option<&Arc<Mutex<CassetteReplayer>>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let replayer = replayer.ok_or_else(|| {
        format!(
            "Replaying adapter: no cassette configured for port '{port}'. \
             Configure a cassette or use live mode."
        )
    })?;
    let mut guard = replayer.lock().map_err(|e| format!("replayer lock poisoned: {e}"))?;
    Ok(guard.next_interaction(port, method)?.output.clone())
}

/// Deserialize a replayed output as `Result<T, Error>`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Err(msg.into());
    }
    if let Some(ok_val) = output.get("Ok").or_else(|| output.get("ok")) {
        return serde_json::from_value(ok_val.clone())
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>);
    }
    serde_json::from_value(output)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
}
