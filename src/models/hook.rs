use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::input::StatusInput;

/// Accept any JSON value for a field, keeping it only if it has the expected type.
///
/// A wrong-typed field becomes `None` instead of failing the whole payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

#[derive(Deserialize, Debug, Default)]
pub struct HookModel {
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HookWorkspace {
    #[serde(default, deserialize_with = "lenient")]
    pub current_dir: Option<String>,
}

/// Cost summary provided by the session's statusLine input
#[derive(Deserialize, Debug, Default)]
pub struct HookCost {
    #[serde(default, deserialize_with = "lenient")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_duration_ms: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HookContextWindow {
    #[serde(default, deserialize_with = "lenient")]
    pub used_percentage: Option<f64>,
}

/// Payload read from stdin. Every field is optional and tolerant of the wrong type.
#[derive(Deserialize, Debug, Default)]
pub struct HookJson {
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<HookModel>,
    #[serde(default, deserialize_with = "lenient")]
    pub workspace: Option<HookWorkspace>,
    #[serde(default, deserialize_with = "lenient")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<HookCost>,
    #[serde(default, deserialize_with = "lenient")]
    pub context_window: Option<HookContextWindow>,
}

impl HookJson {
    /// Parse raw stdin bytes. Malformed JSON or a non-object document yields an empty payload.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice(raw) {
            Ok(hook) => hook,
            Err(err) => {
                tracing::debug!(error = %err, bytes = raw.len(), "payload not usable, using empty object");
                Self::default()
            }
        }
    }

    pub fn status_input(&self) -> StatusInput {
        let model = self
            .model
            .as_ref()
            .and_then(|m| m.display_name.clone())
            .unwrap_or_default();

        let cwd = self
            .workspace
            .as_ref()
            .and_then(|w| w.current_dir.clone())
            .filter(|d| !d.is_empty())
            .or_else(|| self.cwd.clone().filter(|d| !d.is_empty()))
            .unwrap_or_default();

        let cost_usd = self
            .cost
            .as_ref()
            .and_then(|c| c.total_cost_usd)
            .unwrap_or(0.0);

        let duration_ms = self
            .cost
            .as_ref()
            .and_then(|c| c.total_duration_ms)
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms.floor() as u64)
            .unwrap_or(0);

        // Floored, not rounded.
        let context_pct = self
            .context_window
            .as_ref()
            .and_then(|c| c.used_percentage)
            .filter(|p| p.is_finite())
            .map(|p| p.floor() as i64)
            .unwrap_or(0);

        StatusInput {
            model,
            cwd,
            cost_usd,
            duration_ms,
            context_pct,
        }
    }
}
