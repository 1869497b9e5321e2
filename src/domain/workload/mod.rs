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

//! Workload provisioning and exposure

pub mod descriptor;
pub mod exposer;
pub mod intent;
pub mod outcome;
pub mod pipeline;
pub mod provisioner;

pub use self::descriptor::WorkloadDescriptor;
pub use self::exposer::RouteExposer;
pub use self::intent::Intent;
pub use self::outcome::{
    EndpointState, ExposeResult, Orphan, ProvisionResult, ResourceRef, Rollback, RouteState,
    Stage, WorkloadState, WorkloadStatus,
};
pub use self::pipeline::{Compensator, Pipeline, Step};
pub use self::provisioner::WorkloadProvisioner;
