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

//! Stack composition: what gets declared, in which order

pub mod addons;
pub mod bootstrap;
pub mod cluster;
pub mod composer;
pub mod descriptor;
pub mod fleet;
pub mod network;
pub mod zone;

pub use self::addons::{AddOn, AddOnInstaller, AddOnSelection, InstalledAddOn};
pub use self::bootstrap::BootstrapScript;
pub use self::cluster::{ClusterBuilder, DownstreamCluster, NodePool, NodePoolSpec, NodeRoles, SyncBarrier};
pub use self::composer::{ComposedStack, StackComposer};
pub use self::descriptor::StackDescriptor;
pub use self::fleet::{FleetBuilder, FleetMember};
pub use self::network::{NetworkBuilder, NetworkStack, Subnet};
pub use self::zone::Zone;
