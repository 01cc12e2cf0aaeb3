use agri_advisor::advisory::InferenceKind;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_kind(raw: &str) -> Result<InferenceKind, String> {
    InferenceKind::parse(raw)
        .ok_or_else(|| format!("unknown advisory flow '{raw}' (expected crop, fertilizer or yield)"))
}

/// Splits `key=value`; the value may itself contain `=`.
pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
