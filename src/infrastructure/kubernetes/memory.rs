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

//! In-process gateway used as a test double.

use crate::infrastructure::kubernetes::client::{ClusterGateway, CreateOutcome, DeleteOutcome};
use crate::infrastructure::kubernetes::resources::{ResourceKind, ResourceSpec};
use crate::shared::error::GatewayError;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Key = (ResourceKind, String);

/// A namespaced object store with call counters and scripted failures.
#[derive(Default)]
pub struct InMemoryGateway {
    objects: Mutex<BTreeMap<Key, ResourceSpec>>,
    create_failures: Mutex<HashMap<ResourceKind, VecDeque<GatewayError>>>,
    delete_failures: Mutex<HashMap<ResourceKind, VecDeque<GatewayError>>>,
    creates: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next create of `kind` fails with `error` instead of touching the store.
    pub fn fail_next_create(&self, kind: ResourceKind, error: GatewayError) {
        lock(&self.create_failures)
            .entry(kind)
            .or_default()
            .push_back(error);
    }

    /// The next delete of `kind` fails with `error` instead of touching the store.
    pub fn fail_next_delete(&self, kind: ResourceKind, error: GatewayError) {
        lock(&self.delete_failures)
            .entry(kind)
            .or_default()
            .push_back(error);
    }

    /// Stores an object directly, bypassing counters.
    pub fn insert(&self, spec: ResourceSpec) {
        let key = (spec.kind(), spec.name().to_string());
        lock(&self.objects).insert(key, spec);
    }

    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        lock(&self.objects).contains_key(&(kind, name.to_string()))
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.create_calls() + self.get_calls() + self.delete_calls()
    }

    fn scripted_failure(
        failures: &Mutex<HashMap<ResourceKind, VecDeque<GatewayError>>>,
        kind: ResourceKind,
    ) -> Option<GatewayError> {
        lock(failures).get_mut(&kind).and_then(VecDeque::pop_front)
    }
}

// A poisoned lock only means another test thread panicked; the map is still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl ClusterGateway for InMemoryGateway {
    async fn create(&self, spec: &ResourceSpec) -> Result<CreateOutcome, GatewayError> {
        self.creates.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = Self::scripted_failure(&self.create_failures, spec.kind()) {
            return Err(err);
        }

        let key = (spec.kind(), spec.name().to_string());
        let mut objects = lock(&self.objects);
        if objects.contains_key(&key) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        objects.insert(key, spec.clone());
        Ok(CreateOutcome::Created)
    }

    async fn get(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<ResourceSpec>, GatewayError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.objects).get(&(kind, name.to_string())).cloned())
    }

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<DeleteOutcome, GatewayError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = Self::scripted_failure(&self.delete_failures, kind) {
            return Err(err);
        }

        match lock(&self.objects).remove(&(kind, name.to_string())) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}
