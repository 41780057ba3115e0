use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ObjectFieldSelector};
use tracing::warn;

use crate::config::SidecarParams;

/// Sentinel a caller may put in an address variable to request the node's
/// host IP through the downward API instead of a fixed literal. Useful when
/// the tracing or stats agent runs as a daemonset on each node.
pub const HOST_IP_SENTINEL: &str = "ref:status.hostIP";

const HOST_IP_FIELD_PATH: &str = "status.hostIP";

/// The only variables eligible for host IP substitution. Everywhere else the
/// sentinel is an ordinary literal.
const HOST_IP_ELIGIBLE_KEYS: &[&str] = &["STATSD_ADDRESS", "DATADOG_TRACER_ADDRESS"];

/// Where Envoy expects its Jaeger tracing config; the webhook provisions the
/// file through the tracing config volume.
pub const TRACING_CFG_FILE: &str = "/tmp/envoy/envoyconf.yaml";

/// One rendered environment value: a literal, or a downward-API field
/// reference resolved by the kubelet at container start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    FieldRef(&'static str),
}

impl EnvValue {
    fn into_env_var(self, name: String) -> EnvVar {
        match self {
            EnvValue::Literal(value) => EnvVar {
                name,
                value: Some(value),
                ..Default::default()
            },
            EnvValue::FieldRef(field_path) => EnvVar {
                name,
                value: None,
                value_from: Some(EnvVarSource {
                    field_ref: Some(ObjectFieldSelector {
                        field_path: field_path.to_owned(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            },
        }
    }
}

/// Decides how one key/value pair renders.
pub fn render_value(key: &str, value: String) -> EnvValue {
    if HOST_IP_ELIGIBLE_KEYS.contains(&key) && value == HOST_IP_SENTINEL {
        EnvValue::FieldRef(HOST_IP_FIELD_PATH)
    } else {
        EnvValue::Literal(value)
    }
}

/// One conditional piece of the sidecar environment. Each rule owns a
/// disjoint set of keys and is gated only by its own predicate, so features
/// stay independent of each other.
struct EnvRule {
    applies: fn(&SidecarParams) -> bool,
    apply: fn(&SidecarParams, &mut BTreeMap<String, String>),
}

static ENV_RULES: &[EnvRule] = &[
    EnvRule {
        applies: |params| params.enable_sds,
        apply: |params, env| {
            env.insert(
                "APPMESH_SDS_SOCKET_PATH".to_owned(),
                params.sds_uds_path.clone(),
            );
        },
    },
    // Absence of these two overrides means "use the proxy default", so no
    // entry is emitted at all.
    EnvRule {
        applies: |params| params.admin_access_port != 0,
        apply: |params, env| {
            env.insert(
                "ENVOY_ADMIN_ACCESS_PORT".to_owned(),
                params.admin_access_port.to_string(),
            );
        },
    },
    EnvRule {
        applies: |params| !params.admin_access_log_file.is_empty(),
        apply: |params, env| {
            env.insert(
                "ENVOY_ADMIN_ACCESS_LOG_FILE".to_owned(),
                params.admin_access_log_file.clone(),
            );
        },
    },
    EnvRule {
        applies: |params| params.enable_xray_tracing,
        apply: |params, env| {
            env.insert("ENABLE_ENVOY_XRAY_TRACING".to_owned(), "1".to_owned());
            env.insert(
                "XRAY_DAEMON_PORT".to_owned(),
                params.xray_daemon_port.to_string(),
            );
        },
    },
    EnvRule {
        applies: |params| params.enable_datadog_tracing,
        apply: |params, env| {
            env.insert("ENABLE_ENVOY_DATADOG_TRACING".to_owned(), "1".to_owned());
            env.insert(
                "DATADOG_TRACER_PORT".to_owned(),
                params.datadog_tracer_port.to_string(),
            );
            env.insert(
                "DATADOG_TRACER_ADDRESS".to_owned(),
                params.datadog_tracer_address.clone(),
            );
        },
    },
    EnvRule {
        applies: |params| params.enable_stats_tags,
        apply: |_, env| {
            env.insert("ENABLE_ENVOY_STATS_TAGS".to_owned(), "1".to_owned());
        },
    },
    EnvRule {
        applies: |params| params.enable_statsd,
        apply: |params, env| {
            env.insert("ENABLE_ENVOY_DOG_STATSD".to_owned(), "1".to_owned());
            env.insert("STATSD_PORT".to_owned(), params.statsd_port.to_string());
            env.insert(
                "STATSD_ADDRESS".to_owned(),
                params.statsd_address.clone(),
            );
        },
    },
    EnvRule {
        applies: |params| params.enable_jaeger_tracing,
        apply: |_, env| {
            env.insert("ENVOY_TRACING_CFG_FILE".to_owned(), TRACING_CFG_FILE.to_owned());
        },
    },
];

/// Merges the controller-managed environment into `env` and renders the
/// final, deduplicated entry list.
///
/// Controller-managed keys always win over caller-supplied values; pod
/// annotations can never shadow controller-owned settings. Feature entries
/// come from the rule table, and the output is collected in key order so two
/// renders of the same input never produce a spurious reconciliation diff.
///
/// This stage cannot fail: parameters of enabled features are passed through
/// as literals, well formed or not.
pub fn sidecar_env(params: &SidecarParams, env: &mut BTreeMap<String, String>) -> Vec<EnvVar> {
    let managed = [
        (
            "APPMESH_VIRTUAL_NODE_NAME".to_owned(),
            params.virtual_node_ref(),
        ),
        ("AWS_REGION".to_owned(), params.aws_region.clone()),
        ("APPMESH_PREVIEW".to_owned(), params.preview.clone()),
        ("ENVOY_LOG_LEVEL".to_owned(), params.log_level.clone()),
    ];

    for (key, value) in managed {
        let discarded = env.insert(key.clone(), value.clone());
        if discarded.is_some_and(|previous| previous != value) {
            warn!(%key, "caller-supplied value for a controller-managed variable was dropped");
        }
    }

    for rule in ENV_RULES {
        if (rule.applies)(params) {
            (rule.apply)(params, env);
        }
    }

    env.iter()
        .map(|(key, value)| render_value(key, value.clone()).into_env_var(key.clone()))
        .collect()
}
