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

use crate::domain::config::settings::{vpc_octets, StackSettings};
use crate::infrastructure::constants::SUBNET_PREFIX_LEN;
use crate::shared::error::{Result, StackError};

/// An availability zone and its position in the zone list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    index: usize,
    suffix: String,
    region: String,
}

impl Zone {
    pub fn new(index: usize, suffix: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            index,
            suffix: suffix.into(),
            region: region.into(),
        }
    }

    /// Zones of the configured region, in settings order.
    pub fn from_settings(settings: &StackSettings) -> Vec<Zone> {
        settings
            .zones
            .iter()
            .enumerate()
            .map(|(i, suffix)| Zone::new(i, suffix, &settings.region))
            .collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Full zone name, e.g. `eu-west-2a`.
    pub fn name(&self) -> String {
        format!("{}{}", self.region, self.suffix)
    }

    /// `/24` block at the zone's index inside the `/16` VPC block.
    pub fn subnet_cidr(&self, vpc_cidr: &str) -> Result<String> {
        let (a, b) = vpc_octets(vpc_cidr)?;
        let third = u8::try_from(self.index).map_err(|_| {
            StackError::invalid_config(
                "zones",
                format!("zone index {} does not fit in {}", self.index, vpc_cidr),
            )
        })?;
        Ok(format!("{}.{}.{}.0/{}", a, b, third, SUBNET_PREFIX_LEN))
    }
}
