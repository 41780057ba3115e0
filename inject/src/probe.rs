use k8s_openapi::api::core::v1::{ExecAction, Probe};

/// The probe hits the local admin endpoint, so one second is plenty.
pub const PROBE_TIMEOUT_SECONDS: i32 = 1;
/// A single LIVE response clears a previously failed probe.
pub const PROBE_SUCCESS_THRESHOLD: i32 = 1;
/// A few consecutive failures are tolerated to absorb startup jitter.
pub const PROBE_FAILURE_THRESHOLD: i32 = 3;

/// Builds the Envoy readiness probe.
///
/// `/server_info` reports `state` as one of LIVE, DRAINING, PRE_INITIALIZING
/// or INITIALIZING; only LIVE counts as ready.
pub fn readiness_probe(
    initial_delay_seconds: i32,
    period_seconds: i32,
    admin_access_port: &str,
) -> Probe {
    let command = format!(
        "curl -s http://localhost:{admin_access_port}/server_info | grep state | grep -q LIVE"
    );

    Probe {
        exec: Some(ExecAction {
            command: Some(vec!["sh".to_owned(), "-c".to_owned(), command]),
        }),
        initial_delay_seconds: Some(initial_delay_seconds),
        timeout_seconds: Some(PROBE_TIMEOUT_SECONDS),
        period_seconds: Some(period_seconds),
        success_threshold: Some(PROBE_SUCCESS_THRESHOLD),
        failure_threshold: Some(PROBE_FAILURE_THRESHOLD),
        ..Default::default()
    }
}
