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

/// Stack configuration keys
pub const KEY_ACCESS_KEY: &str = "rancherEC2AccessKey";
pub const KEY_SECRET_KEY: &str = "rancherEC2SecretKey";
pub const KEY_INSTALL_DOWNSTREAM_CLUSTER: &str = "installDownstreamCluster";
pub const KEY_INSTALL_FLEET_CLUSTERS: &str = "installFleetClusters";
pub const KEY_DOWNSTREAM_CLUSTER_SIZE: &str = "downstreamClusterEC2Size";
pub const KEY_FLEET_CLUSTERS_SIZE: &str = "fleetClustersEC2Size";
pub const KEY_INSTALL_ISTIO: &str = "installIstio";
pub const KEY_INSTALL_OPA: &str = "installOPA";
pub const KEY_INSTALL_CIS: &str = "installCIS";
pub const KEY_INSTALL_LOGGING: &str = "installLogging";
pub const KEY_INSTALL_LONGHORN: &str = "installLonghorn";
pub const KEY_INSTALL_MONITORING: &str = "installMonitoring";

/// Environment
pub const ENV_SETTINGS_FILE: &str = "RANCHER_INFRA_SETTINGS";
pub const ENV_ENGINE_BINARY: &str = "RANCHER_INFRA_PULUMI";

/// Engine
pub const ENGINE_BINARY: &str = "pulumi";
pub const PROGRAM_FILE_NAME: &str = "Pulumi.yaml";
pub const PROGRAM_RUNTIME: &str = "yaml";

/// Lookups
pub const FN_AVAILABILITY_ZONES: &str = "aws:getAvailabilityZones";
pub const ZONE_STATE_AVAILABLE: &str = "available";
pub const VARIABLE_ZONE_LIST: &str = "zoneList";

/// Network
pub const OPEN_CIDR: &str = "0.0.0.0/0";
pub const ALL_PROTOCOLS: &str = "-1";
pub const SUBNET_PREFIX_LEN: u8 = 24;

/// Cluster
pub const CLUSTER_DRIVER_RKE: &str = "rancherKubernetesEngine";
pub const CLUSTER_TOKEN_COMMAND: &str = "clusterRegistrationToken.command";

/// Bootstrap
pub const IMDS_TOKEN_URL: &str = "http://169.254.169.254/latest/api/token";
pub const IMDS_PUBLIC_IP_URL: &str = "http://169.254.169.254/latest/meta-data/public-ipv4";
pub const IMDS_TOKEN_TTL_SECONDS: u32 = 21600;
pub const K3S_INSTALL_URL: &str = "https://get.k3s.io";

/// Stack outputs
pub const OUTPUT_VPC_ID: &str = "vpcId";
pub const OUTPUT_SUBNET_IDS: &str = "subnetIds";
pub const OUTPUT_CLUSTER_ID: &str = "clusterId";
pub const OUTPUT_FLEET_CLUSTER_IDS: &str = "fleetClusterIds";
pub const OUTPUT_FLEET_COMMANDS: &str = "fleetRegistrationCommands";

/// Placeholder the engine reports for a secret output unless asked to reveal it.
pub const MASKED_SECRET: &str = "[secret]";

/// Outputs derived from provider secrets.
pub const SECRET_OUTPUTS: &[&str] = &[OUTPUT_FLEET_COMMANDS];
