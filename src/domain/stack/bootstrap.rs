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

use crate::domain::graph::Output;
use crate::infrastructure::constants::*;

/// Instance user data that installs K3s and registers the node with Rancher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapScript {
    k3s_version: String,
}

impl BootstrapScript {
    pub fn new(k3s_version: impl Into<String>) -> Self {
        Self {
            k3s_version: k3s_version.into(),
        }
    }

    pub fn render(&self, registration_command: &str) -> String {
        let mut script = String::from("#!/bin/bash\n");
        script.push_str(&format!(
            "TOKEN=$(curl -s -X PUT \"{}\" -H \"X-aws-ec2-metadata-token-ttl-seconds: {}\")\n",
            IMDS_TOKEN_URL, IMDS_TOKEN_TTL_SECONDS
        ));
        script.push_str(&format!(
            "IP=$(curl -s -H \"X-aws-ec2-metadata-token: $TOKEN\" {})\n",
            IMDS_PUBLIC_IP_URL
        ));
        script.push_str(&format!(
            "curl -sfL {} | INSTALL_K3S_VERSION={} INSTALL_K3S_EXEC=\"--node-external-ip $IP\" sh -\n",
            K3S_INSTALL_URL, self.k3s_version
        ));
        script.push_str(registration_command);
        script.push('\n');
        script
    }

    /// Chains the script onto a pending registration command.
    pub fn attach(&self, command: Output) -> Output {
        let script = self.clone();
        command.apply(move |cmd| script.render(cmd))
    }
}
