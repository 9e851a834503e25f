//! Projection of Kubernetes objects into display records.
//!
//! Every function takes the instant used as "now" so ages are deterministic
//! under test.

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service, ServicePort};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;

use k8s_shared_types::{BridgeError, DeploymentInfo, NamespaceInfo, PodInfo, Result, ServiceInfo};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Age of an object rendered in its coarsest whole unit: `45s`, `12m`, `3h`, `9d`.
///
/// Always floor-truncated. A missing timestamp or one in the future is `0s`.
pub fn format_age(created: Option<&Time>, now: DateTime<Utc>) -> String {
    let Some(Time(created)) = created else {
        return "0s".to_string();
    };
    let secs = (now - *created).num_seconds().max(0);

    if secs < MINUTE {
        format!("{}s", secs)
    } else if secs < HOUR {
        format!("{}m", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h", secs / HOUR)
    } else {
        format!("{}d", secs / DAY)
    }
}

pub fn pod_info(pod: &Pod, now: DateTime<Utc>) -> PodInfo {
    let status = pod.status.as_ref();
    let containers = status
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or_default();

    // Readiness is counted over reported container statuses, not spec containers.
    let total = containers.len();
    let ready = containers.iter().filter(|c| c.ready).count();
    let restarts: i32 = containers.iter().map(|c| c.restart_count).sum();

    PodInfo {
        name: pod.name_any(),
        namespace: pod.namespace().unwrap_or_default(),
        status: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
        ready: format!("{}/{}", ready, total),
        restarts,
        age: format_age(pod.metadata.creation_timestamp.as_ref(), now),
        labels: pod.labels().clone(),
        node_name: pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .unwrap_or_default(),
        pod_ip: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
    }
}

pub fn service_info(service: &Service, now: DateTime<Utc>) -> ServiceInfo {
    let spec = service.spec.as_ref();

    let ports = spec
        .and_then(|s| s.ports.as_ref())
        .map(|ports| ports.iter().map(format_service_port).collect())
        .unwrap_or_default();

    let mut external_ips = Vec::new();
    let ingress = service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref());
    for entry in ingress.into_iter().flatten() {
        if let Some(ip) = entry.ip.as_ref().filter(|ip| !ip.is_empty()) {
            external_ips.push(ip.clone());
        }
        if let Some(host) = entry.hostname.as_ref().filter(|h| !h.is_empty()) {
            external_ips.push(host.clone());
        }
    }

    ServiceInfo {
        name: service.name_any(),
        namespace: service.namespace().unwrap_or_default(),
        service_type: spec.and_then(|s| s.type_.clone()).unwrap_or_default(),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
        external_ips,
        ports,
        age: format_age(service.metadata.creation_timestamp.as_ref(), now),
        labels: service.labels().clone(),
        selector: spec.and_then(|s| s.selector.clone()).unwrap_or_default(),
    }
}

/// `80/TCP`, or `80/TCP:30080` when a node port is allocated.
fn format_service_port(port: &ServicePort) -> String {
    let protocol = port.protocol.as_deref().unwrap_or("TCP");
    match port.node_port {
        Some(node_port) if node_port != 0 => format!("{}/{}:{}", port.port, protocol, node_port),
        _ => format!("{}/{}", port.port, protocol),
    }
}

/// Fails when `spec.replicas` is absent, since the ready string is relative to it.
pub fn deployment_info(deployment: &Deployment, now: DateTime<Utc>) -> Result<DeploymentInfo> {
    let name = deployment.name_any();
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .ok_or_else(|| BridgeError::MissingField {
            kind: "deployment",
            name: name.clone(),
            field: "spec.replicas",
        })?;

    let status = deployment.status.as_ref();
    let ready = status.and_then(|s| s.ready_replicas).unwrap_or(0);

    Ok(DeploymentInfo {
        namespace: deployment.namespace().unwrap_or_default(),
        ready: format!("{}/{}", ready, desired),
        up_to_date: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        available: status.and_then(|s| s.available_replicas).unwrap_or(0),
        age: format_age(deployment.metadata.creation_timestamp.as_ref(), now),
        labels: deployment.labels().clone(),
        replicas: desired,
        name,
    })
}

pub fn namespace_info(namespace: &Namespace, now: DateTime<Utc>) -> NamespaceInfo {
    NamespaceInfo {
        name: namespace.name_any(),
        status: namespace
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
        age: format_age(namespace.metadata.creation_timestamp.as_ref(), now),
        labels: namespace.labels().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};
    use k8s_openapi::api::core::v1::{
        ContainerStatus, LoadBalancerIngress, LoadBalancerStatus, NamespaceStatus, PodSpec,
        PodStatus, ServiceSpec, ServiceStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn meta(name: &str, namespace: &str, created: DateTime<Utc>) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([("app".to_string(), "test".to_string())])),
            creation_timestamp: Some(Time(created)),
            ..Default::default()
        }
    }

    fn container(ready: bool, restarts: i32) -> ContainerStatus {
        ContainerStatus {
            ready,
            restart_count: restarts,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_age_units() {
        let now = Utc::now();
        let cases = [
            (Duration::seconds(30), "30s"),
            (Duration::minutes(5), "5m"),
            (Duration::hours(3), "3h"),
            (Duration::hours(25), "1d"),
        ];
        for (ago, expected) in cases {
            assert_eq!(format_age(Some(&Time(now - ago)), now), expected);
        }
    }

    #[test]
    fn test_format_age_truncates_and_handles_edges() {
        let now = Utc::now();
        assert_eq!(format_age(Some(&Time(now - Duration::seconds(119))), now), "1m");
        assert_eq!(format_age(Some(&Time(now - Duration::minutes(60))), now), "1h");
        assert_eq!(format_age(Some(&Time(now - Duration::hours(47))), now), "1d");
        assert_eq!(format_age(Some(&Time(now + Duration::seconds(10))), now), "0s");
        assert_eq!(format_age(None, now), "0s");
    }

    #[test]
    fn test_pod_info_running() {
        let now = Utc::now();
        let pod = Pod {
            metadata: meta("test-pod-1", "default", now - Duration::hours(1)),
            spec: Some(PodSpec {
                node_name: Some("test-node-1".to_string()),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                pod_ip: Some("10.0.0.1".to_string()),
                container_statuses: Some(vec![container(true, 0)]),
                ..Default::default()
            }),
        };

        let info = pod_info(&pod, now);
        assert_eq!(info.name, "test-pod-1");
        assert_eq!(info.namespace, "default");
        assert_eq!(info.status, "Running");
        assert_eq!(info.ready, "1/1");
        assert_eq!(info.restarts, 0);
        assert_eq!(info.age, "1h");
        assert_eq!(info.node_name, "test-node-1");
        assert_eq!(info.pod_ip, "10.0.0.1");
        assert_eq!(info.labels.get("app").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_pod_info_counts_statuses_and_restarts() {
        let now = Utc::now();
        let pod = Pod {
            metadata: meta("multi", "default", now - Duration::minutes(30)),
            spec: None,
            status: Some(PodStatus {
                phase: Some("Pending".to_string()),
                container_statuses: Some(vec![
                    container(false, 1),
                    container(true, 2),
                    container(false, 0),
                ]),
                ..Default::default()
            }),
        };

        let info = pod_info(&pod, now);
        assert_eq!(info.ready, "1/3");
        assert_eq!(info.restarts, 3);
        assert_eq!(info.age, "30m");
        assert!(info.node_name.is_empty());
    }

    #[test]
    fn test_pod_info_without_status() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("bare".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let info = pod_info(&pod, Utc::now());
        assert_eq!(info.ready, "0/0");
        assert_eq!(info.status, "");
        assert!(info.labels.is_empty());
    }

    #[test]
    fn test_service_info_cluster_ip() {
        let now = Utc::now();
        let service = Service {
            metadata: meta("test-service", "default", now - Duration::days(2)),
            spec: Some(ServiceSpec {
                type_: Some("ClusterIP".to_string()),
                cluster_ip: Some("10.0.0.100".to_string()),
                ports: Some(vec![ServicePort {
                    port: 80,
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                }]),
                selector: Some(BTreeMap::from([("app".to_string(), "test".to_string())])),
                ..Default::default()
            }),
            status: None,
        };

        let info = service_info(&service, now);
        assert_eq!(info.service_type, "ClusterIP");
        assert_eq!(info.cluster_ip, "10.0.0.100");
        assert_eq!(info.ports, vec!["80/TCP"]);
        assert!(info.external_ips.is_empty());
        assert_eq!(info.selector.get("app").map(String::as_str), Some("test"));
        assert_eq!(info.age, "2d");
    }

    #[test]
    fn test_service_info_load_balancer() {
        let now = Utc::now();
        let service = Service {
            metadata: meta("edge", "prod", now),
            spec: Some(ServiceSpec {
                type_: Some("LoadBalancer".to_string()),
                ports: Some(vec![
                    ServicePort {
                        port: 443,
                        protocol: Some("TCP".to_string()),
                        node_port: Some(30443),
                        ..Default::default()
                    },
                    ServicePort {
                        port: 53,
                        protocol: Some("UDP".to_string()),
                        node_port: Some(0),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus {
                    ingress: Some(vec![
                        LoadBalancerIngress {
                            ip: Some("34.1.2.3".to_string()),
                            ..Default::default()
                        },
                        LoadBalancerIngress {
                            hostname: Some("lb.example.com".to_string()),
                            ip: Some(String::new()),
                            ..Default::default()
                        },
                    ]),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };

        let info = service_info(&service, now);
        assert_eq!(info.ports, vec!["443/TCP:30443", "53/UDP"]);
        assert_eq!(info.external_ips, vec!["34.1.2.3", "lb.example.com"]);
    }

    #[test]
    fn test_deployment_info_ready_against_desired() {
        let now = Utc::now();
        let deployment = Deployment {
            metadata: meta("test-deployment", "default", now - Duration::minutes(10)),
            spec: Some(DeploymentSpec {
                replicas: Some(3),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                ready_replicas: Some(2),
                updated_replicas: Some(3),
                available_replicas: Some(2),
                replicas: Some(3),
                ..Default::default()
            }),
        };

        let info = deployment_info(&deployment, now).unwrap();
        assert_eq!(info.ready, "2/3");
        assert_eq!(info.up_to_date, 3);
        assert_eq!(info.available, 2);
        assert_eq!(info.replicas, 3);
        assert_eq!(info.age, "10m");
    }

    #[test]
    fn test_deployment_info_without_status_reports_zero_ready() {
        let deployment = Deployment {
            metadata: meta("fresh", "default", Utc::now()),
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                ..Default::default()
            }),
            status: None,
        };
        let info = deployment_info(&deployment, Utc::now()).unwrap();
        assert_eq!(info.ready, "0/1");
        assert_eq!(info.available, 0);
    }

    #[test]
    fn test_deployment_info_missing_replicas_is_an_error() {
        let deployment = Deployment {
            metadata: meta("broken", "default", Utc::now()),
            spec: Some(DeploymentSpec::default()),
            status: None,
        };
        let err = deployment_info(&deployment, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingField {
                field: "spec.replicas",
                ..
            }
        ));
    }

    #[test]
    fn test_namespace_info() {
        let now = Utc::now();
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some("kube-system".to_string()),
                creation_timestamp: Some(Time(now - Duration::days(40))),
                ..Default::default()
            },
            status: Some(NamespaceStatus {
                phase: Some("Active".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let info = namespace_info(&namespace, now);
        assert_eq!(info.name, "kube-system");
        assert_eq!(info.status, "Active");
        assert_eq!(info.age, "40d");
        assert!(info.labels.is_empty());
    }
}
