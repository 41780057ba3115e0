use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, ExecAction, Lifecycle, LifecycleHandler, SecurityContext,
    VolumeMount,
};
use tracing::Level;

use crate::{config::SidecarParams, env::sidecar_env};

pub const ENVOY_CONTAINER_NAME: &str = "envoy";

/// Fixed non-root UID reserved for the proxy; the mesh's traffic
/// interception rules key off it.
pub const ENVOY_RUN_AS_USER: i64 = 1337;

pub const STATS_PORT_NAME: &str = "stats";

/// Mount point for the Jaeger tracing config volume.
pub const TRACING_CFG_MOUNT_PATH: &str = "/tmp/envoy";

/// Composes the full Envoy sidecar container spec for one workload.
///
/// `env` is the caller-supplied environment (typically sourced from pod
/// annotations); it is merged in place by [`sidecar_env`], so give each call
/// its own map.
#[tracing::instrument(level = Level::TRACE, skip(env))]
pub fn build_sidecar(params: &SidecarParams, env: &mut BTreeMap<String, String>) -> Container {
    // The file behind this mount is provisioned by the webhook, not here.
    let volume_mounts = params.enable_jaeger_tracing.then(|| {
        vec![VolumeMount {
            name: params.tracing_cfg_volume_name.clone(),
            mount_path: TRACING_CFG_MOUNT_PATH.to_owned(),
            ..Default::default()
        }]
    });

    Container {
        name: ENVOY_CONTAINER_NAME.to_owned(),
        image: Some(params.sidecar_image.clone()),
        security_context: Some(SecurityContext {
            run_as_user: Some(ENVOY_RUN_AS_USER),
            ..Default::default()
        }),
        ports: Some(vec![ContainerPort {
            name: Some(STATS_PORT_NAME.to_owned()),
            container_port: i32::from(params.effective_admin_port()),
            protocol: Some("TCP".to_owned()),
            ..Default::default()
        }]),
        lifecycle: Some(Lifecycle {
            pre_stop: Some(LifecycleHandler {
                exec: Some(ExecAction {
                    command: Some(vec![
                        "sh".to_owned(),
                        "-c".to_owned(),
                        format!("sleep {}", params.pre_stop_delay),
                    ]),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        volume_mounts,
        env: Some(sidecar_env(params, env)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn base_params() -> SidecarParams {
        SidecarParams {
            mesh_name: "m1".to_owned(),
            virtual_node_name: "vn1".to_owned(),
            aws_region: "us-west-2".to_owned(),
            sidecar_image: "840364872350.dkr.ecr.us-west-2.amazonaws.com/aws-appmesh-envoy:v1.12.1.1-prod".to_owned(),
            preview: "0".to_owned(),
            log_level: "info".to_owned(),
            pre_stop_delay: "20".to_owned(),
            ..Default::default()
        }
    }

    #[rstest]
    fn container_skeleton() {
        let container = build_sidecar(&base_params(), &mut BTreeMap::new());

        assert_eq!(container.name, "envoy");
        assert_eq!(
            container.image.as_deref(),
            Some("840364872350.dkr.ecr.us-west-2.amazonaws.com/aws-appmesh-envoy:v1.12.1.1-prod")
        );
        assert_eq!(
            container
                .security_context
                .as_ref()
                .and_then(|sc| sc.run_as_user),
            Some(1337)
        );

        let ports = container.ports.as_deref().unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].name.as_deref(), Some("stats"));
        assert_eq!(ports[0].container_port, 9901);
        assert_eq!(ports[0].protocol.as_deref(), Some("TCP"));
    }

    #[rstest]
    fn pre_stop_sleeps_for_the_drain_delay() {
        let container = build_sidecar(&base_params(), &mut BTreeMap::new());

        let pre_stop = container.lifecycle.unwrap().pre_stop.unwrap();
        assert_eq!(
            serde_json::to_value(&pre_stop).unwrap(),
            json!({"exec": {"command": ["sh", "-c", "sleep 20"]}})
        );
    }

    #[rstest]
    fn admin_port_override_moves_the_stats_port() {
        let params = SidecarParams {
            admin_access_port: 10001,
            ..base_params()
        };

        let container = build_sidecar(&params, &mut BTreeMap::new());

        let ports = container.ports.as_deref().unwrap();
        assert_eq!(ports[0].container_port, 10001);
    }

    #[rstest]
    #[case(false, None)]
    #[case(true, Some("tracing-cfg"))]
    fn tracing_config_mount_follows_the_jaeger_toggle(
        #[case] enabled: bool,
        #[case] expected_volume: Option<&str>,
    ) {
        let params = SidecarParams {
            enable_jaeger_tracing: enabled,
            tracing_cfg_volume_name: "tracing-cfg".to_owned(),
            ..base_params()
        };

        let container = build_sidecar(&params, &mut BTreeMap::new());

        match expected_volume {
            None => assert_eq!(container.volume_mounts, None),
            Some(volume) => {
                let mounts = container.volume_mounts.unwrap();
                assert_eq!(mounts.len(), 1);
                assert_eq!(mounts[0].name, volume);
                assert_eq!(mounts[0].mount_path, "/tmp/envoy");
            }
        }
    }

    #[rstest]
    fn env_list_is_attached() {
        let mut env = BTreeMap::from([("EXTRA".to_owned(), "1".to_owned())]);

        let container = build_sidecar(&base_params(), &mut env);

        let env = container.env.unwrap();
        assert!(env.iter().any(|e| e.name == "APPMESH_VIRTUAL_NODE_NAME"));
        assert!(env.iter().any(|e| e.name == "EXTRA"));
    }
}
