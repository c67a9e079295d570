// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[cfg(test)]
mod tests {
    use rancher_infra::domain::config::StackConfig;
    use rancher_infra::domain::stack::AddOn;
    use rancher_infra::infrastructure::constants::*;
    use rancher_infra::*;
    use std::collections::{BTreeSet, HashMap};

    fn config(pairs: &[(&str, &str)]) -> StackConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StackConfig::new(map)
    }

    fn cluster_config(extra: &[(&str, &str)]) -> StackConfig {
        let mut pairs = vec![
            (KEY_INSTALL_DOWNSTREAM_CLUSTER, "true"),
            (KEY_ACCESS_KEY, "AKIAEXAMPLE"),
            (KEY_SECRET_KEY, "example-secret"),
            (KEY_DOWNSTREAM_CLUSTER_SIZE, "t3a.xlarge"),
        ];
        pairs.extend_from_slice(extra);
        config(&pairs)
    }

    fn compose(config: &StackConfig) -> ComposedStack {
        StackComposer::new(&StackSettings::default(), config)
            .compose()
            .expect("stack composes")
    }

    fn count(stack: &ComposedStack, kind: ResourceKind) -> usize {
        stack.graph.of_kind(kind).len()
    }

    fn app_name(addon: AddOn) -> String {
        StackSettings::default().resource_name(addon.slug())
    }

    #[test]
    fn test_subnets_have_distinct_cidrs() {
        let stack = compose(&config(&[]));
        let cidrs: BTreeSet<&str> = stack
            .network
            .subnets
            .iter()
            .map(|s| s.cidr_block.as_str())
            .collect();

        assert_eq!(stack.network.subnets.len(), 3);
        assert_eq!(cidrs.len(), 3);
        for (i, subnet) in stack.network.subnets.iter().enumerate() {
            assert_eq!(subnet.cidr_block, format!("10.0.{}.0/24", i));
        }
    }

    #[test]
    fn test_network_only_stack() {
        let stack = compose(&config(&[]));
        assert_eq!(stack.graph.len(), 7);
        assert_eq!(count(&stack, ResourceKind::Vpc), 1);
        assert_eq!(count(&stack, ResourceKind::DefaultRouteTable), 1);
    }

    #[test]
    fn test_cluster_disabled_ignores_addon_flags() {
        let stack = compose(&config(&[
            (KEY_INSTALL_MONITORING, "true"),
            (KEY_INSTALL_ISTIO, "true"),
            (KEY_INSTALL_LONGHORN, "true"),
        ]));

        for kind in [
            ResourceKind::CloudCredential,
            ResourceKind::NodeTemplate,
            ResourceKind::Cluster,
            ResourceKind::NodePool,
            ResourceKind::ClusterSync,
            ResourceKind::App,
        ] {
            assert_eq!(count(&stack, kind), 0, "{}", kind);
        }
    }

    #[test]
    fn test_cluster_disabled_does_not_need_credentials() {
        // Malformed add-on flags are not read either.
        let stack = compose(&config(&[(KEY_INSTALL_ISTIO, "not-a-bool")]));
        assert!(stack.downstream.is_none());
    }

    #[test]
    fn test_cluster_block() {
        let stack = compose(&cluster_config(&[]));
        assert_eq!(count(&stack, ResourceKind::CloudCredential), 1);
        assert_eq!(count(&stack, ResourceKind::NodeTemplate), 3);
        assert_eq!(count(&stack, ResourceKind::NodePool), 3);
        assert_eq!(count(&stack, ResourceKind::Cluster), 1);
        assert_eq!(count(&stack, ResourceKind::ClusterSync), 1);
        assert_eq!(count(&stack, ResourceKind::App), 0);
    }

    #[test]
    fn test_missing_cluster_config_aborts() {
        let err = StackComposer::new(
            &StackSettings::default(),
            &config(&[(KEY_INSTALL_DOWNSTREAM_CLUSTER, "true")]),
        )
        .compose()
        .unwrap_err();
        assert!(matches!(err, StackError::MissingConfig { .. }));
    }

    #[test]
    fn test_istio_depends_on_monitoring_when_selected() {
        let stack = compose(&cluster_config(&[
            (KEY_INSTALL_MONITORING, "true"),
            (KEY_INSTALL_ISTIO, "true"),
            (KEY_INSTALL_LOGGING, "true"),
        ]));
        let monitoring = app_name(AddOn::Monitoring);
        for addon in [AddOn::Istio, AddOn::Logging] {
            let deps = stack.graph.dependencies(&app_name(addon));
            assert!(deps.contains(&monitoring), "{}", addon);
        }

        let waves = stack.graph.waves();
        let wave_of = |name: &str| waves.iter().position(|w| w.iter().any(|n| *n == name)).unwrap();
        assert!(wave_of(app_name(AddOn::Istio).as_str()) > wave_of(monitoring.as_str()));
    }

    #[test]
    fn test_istio_without_monitoring() {
        let stack = compose(&cluster_config(&[(KEY_INSTALL_ISTIO, "true")]));
        let deps = stack.graph.dependencies(&app_name(AddOn::Istio));
        assert!(!deps.contains(&app_name(AddOn::Monitoring)));
        assert!(deps.contains(&StackSettings::default().resource_name("clustersync")));
    }

    #[test]
    fn test_toggling_one_addon_changes_one_declaration() {
        let base = [
            (KEY_INSTALL_MONITORING, "true"),
            (KEY_INSTALL_ISTIO, "true"),
            (KEY_INSTALL_CIS, "true"),
        ];
        let before = compose(&cluster_config(&base));
        let mut toggled = base.to_vec();
        toggled.push((KEY_INSTALL_OPA, "true"));
        let after = compose(&cluster_config(&toggled));

        let names = |s: &ComposedStack| -> BTreeSet<String> {
            s.graph.iter().map(|d| d.name.clone()).collect()
        };
        let added: Vec<String> = names(&after).difference(&names(&before)).cloned().collect();
        assert_eq!(added, vec![app_name(AddOn::Opa)]);

        for addon in [AddOn::Monitoring, AddOn::Istio, AddOn::Cis] {
            assert_eq!(
                before.graph.dependencies(&app_name(addon)),
                after.graph.dependencies(&app_name(addon)),
                "{}",
                addon
            );
        }
    }

    #[test]
    fn test_fleet_members_are_independent() {
        let stack = compose(&config(&[
            (KEY_INSTALL_FLEET_CLUSTERS, "true"),
            (KEY_FLEET_CLUSTERS_SIZE, "t3a.medium"),
        ]));

        assert_eq!(stack.fleet.len(), 3);
        assert_eq!(count(&stack, ResourceKind::Cluster), 3);
        assert_eq!(count(&stack, ResourceKind::Instance), 3);

        for member in &stack.fleet {
            assert_eq!(member.bootstrap.source().target(), member.cluster.name());
            let deps = stack.graph.dependencies(member.instance.name());
            let other_fleet: Vec<_> = stack
                .fleet
                .iter()
                .filter(|m| m.index != member.index)
                .collect();
            for other in other_fleet {
                assert!(!deps.contains(other.cluster.name()));
            }
        }
    }

    #[test]
    fn test_fleet_without_size_aborts() {
        let result = StackComposer::new(
            &StackSettings::default(),
            &config(&[(KEY_INSTALL_FLEET_CLUSTERS, "true")]),
        )
        .compose();
        assert!(result.is_err());
    }

    fn two_zone_settings() -> StackSettings {
        let mut settings = StackSettings::default();
        settings.zones = vec!["a".to_string(), "b".to_string()];
        settings
    }

    #[test]
    fn test_fewer_zones_without_fleet() {
        let settings = two_zone_settings();
        let stack = StackComposer::new(&settings, &config(&[]))
            .compose()
            .expect("network-only stack composes");

        assert_eq!(stack.network.subnets.len(), 2);
        assert!(stack.fleet.is_empty());
        assert_eq!(count(&stack, ResourceKind::Subnet), 2);
    }

    #[test]
    fn test_fewer_zones_with_fleet_aborts() {
        let settings = two_zone_settings();
        let err = StackComposer::new(
            &settings,
            &config(&[
                (KEY_INSTALL_FLEET_CLUSTERS, "true"),
                (KEY_FLEET_CLUSTERS_SIZE, "t3a.medium"),
            ]),
        )
        .compose()
        .unwrap_err();
        assert!(matches!(err, StackError::InvalidConfig { ref key, .. } if key == "fleet.size"));
    }

    #[test]
    fn test_full_stack_renders() {
        let stack = compose(&cluster_config(&[
            (KEY_INSTALL_FLEET_CLUSTERS, "true"),
            (KEY_FLEET_CLUSTERS_SIZE, "t3a.medium"),
            (KEY_INSTALL_MONITORING, "true"),
            (KEY_INSTALL_ISTIO, "true"),
        ]));
        let text = ProgramRenderer::new("rancher-infra").render(&stack.graph).unwrap();
        let program: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();

        let resources = program["resources"].as_mapping().unwrap();
        assert_eq!(resources.len(), stack.graph.len());
        assert_eq!(
            program["config"][KEY_ACCESS_KEY]["secret"],
            serde_yaml::Value::Bool(true)
        );
        assert!(!text.contains("AKIAEXAMPLE"));
        assert!(!text.contains("example-secret"));

        let user_data = program["resources"]["rancher-infra-fleet-node-0"]["properties"]["userData"]
            .as_str()
            .unwrap();
        assert!(user_data.starts_with("#!/bin/bash\n"));
        assert!(user_data.ends_with("${rancher-infra-fleet-0.clusterRegistrationToken.command}\n"));
    }
}
