use serde::{Deserialize, Serialize};

/// Port the Envoy admin interface listens on when no override is set.
pub const DEFAULT_ADMIN_ACCESS_PORT: u16 = 9901;

/// Per-workload template variables for the Envoy sidecar.
///
/// The admission webhook collects these from mesh annotations and controller
/// flags before asking this crate for a container spec. The record is
/// immutable for the duration of one injection decision.
///
/// Toggles and their parameters are independent: a disabled toggle's
/// parameters are ignored and never validated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidecarParams {
    pub mesh_name: String,
    pub virtual_node_name: String,
    pub aws_region: String,
    pub sidecar_image: String,

    /// Set to `"1"` to connect to the App Mesh Preview Channel endpoint.
    pub preview: String,

    /// Envoy log level: trace, debug, info, warning, error, critical, off.
    pub log_level: String,

    /// Custom Envoy admin port. 0 keeps the proxy default
    /// ([`DEFAULT_ADMIN_ACCESS_PORT`]).
    pub admin_access_port: u16,

    /// Custom path for Envoy admin access logs. Empty keeps the proxy
    /// default (`/tmp/envoy_admin_access.log`).
    pub admin_access_log_file: String,

    /// Seconds the pre-stop hook sleeps so Envoy can drain in-flight
    /// connections before the container is killed.
    pub pre_stop_delay: String,

    /// Serve certificates over SDS at `sds_uds_path`.
    pub enable_sds: bool,
    pub sds_uds_path: String,

    /// X-Ray tracing, default daemon endpoint 127.0.0.1:2000.
    pub enable_xray_tracing: bool,
    pub xray_daemon_port: u16,

    /// Datadog trace collection, default agent endpoint 127.0.0.1:8126.
    pub enable_datadog_tracing: bool,
    pub datadog_tracer_port: u16,
    pub datadog_tracer_address: String,

    /// Jaeger tracing driven by a config file mounted from
    /// `tracing_cfg_volume_name`.
    pub enable_jaeger_tracing: bool,
    pub tracing_cfg_volume_name: String,

    pub enable_stats_tags: bool,

    /// DogStatsD stats, default daemon endpoint 127.0.0.1:8125.
    pub enable_statsd: bool,
    pub statsd_port: u16,
    pub statsd_address: String,
}

impl SidecarParams {
    /// Admin/stats port the proxy actually listens on.
    pub fn effective_admin_port(&self) -> u16 {
        if self.admin_access_port == 0 {
            DEFAULT_ADMIN_ACCESS_PORT
        } else {
            self.admin_access_port
        }
    }

    /// Mesh-level identity of the workload, e.g. `mesh/m1/virtualNode/vn1`.
    pub fn virtual_node_ref(&self) -> String {
        format!(
            "mesh/{}/virtualNode/{}",
            self.mesh_name, self.virtual_node_name
        )
    }
}
