//! Allocation service: the operations exposed to the transport layer.
//!
//! The service owns the assignment store behind a single lock. An allocation
//! run holds that lock across the emptiness check, the engine computation and
//! the commit, so two concurrent runs can never both pass the check. Reset
//! takes the same lock and therefore never interleaves with a run.
//!
//! Authorization is the caller's job; nothing here knows about users.

use crate::format::{format_assignments, section_overview, DisplayRecord, SectionOverview};
use crate::{
    allocate, AssignmentSet, AssignmentStore, Catalog, Eligibility, Error, Result, Room,
    RoomFilter, Section, SectionFilter,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Response body of `status`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_assigned: bool,
}

/// Response body of `run_allocation`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response body of `reset`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetResponse {
    pub success: bool,
}

/// Homebase allocation over a fixed catalog
pub struct AllocationService {
    catalog: Arc<Catalog>,
    eligibility: Eligibility,
    store: Mutex<AssignmentStore>,
}

impl AllocationService {
    /// Create a service with an empty store; the catalog is taken as given
    pub fn new(catalog: Arc<Catalog>, eligibility: Eligibility) -> Self {
        Self {
            catalog,
            eligibility,
            store: Mutex::new(AssignmentStore::new()),
        }
    }

    /// The catalog this service allocates over
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The room eligibility policy used by every run
    pub fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, AssignmentStore>> {
        self.store
            .lock()
            .map_err(|_| Error::State("assignment store lock poisoned".into()))
    }

    /// Whether an allocation result is currently stored
    pub fn status(&self) -> Result<StatusResponse> {
        let store = self.lock_store()?;
        Ok(StatusResponse {
            is_assigned: !store.is_empty(),
        })
    }

    /// Run the engine and commit its result
    ///
    /// - Store non-empty: `Err(Error::AlreadyAssigned)`, nothing changes
    /// - Some section unmatched: `success: false` naming it, nothing changes
    /// - Otherwise the whole set replaces the (empty) store
    pub fn run_allocation(&self) -> Result<AllocationResponse> {
        let mut store = self.lock_store()?;

        if !store.is_empty() {
            tracing::warn!(
                existing = store.count(),
                "Allocation rejected: assignments already exist"
            );
            return Err(Error::AlreadyAssigned);
        }

        let eligibility = self.eligibility;
        let outcome = allocate(
            &self.catalog.sections,
            &self.catalog.rooms,
            |r| eligibility.admits(r),
            Utc::now(),
        );

        match outcome {
            Ok(set) => {
                let count = set.len();
                tracing::info!(count, run_id = ?set.run_id, %eligibility, "Committed allocation run");
                store.replace_all(set);
                Ok(AllocationResponse {
                    success: true,
                    count: Some(count),
                    message: None,
                })
            }
            Err(e @ Error::Infeasible { .. }) => Ok(AllocationResponse {
                success: false,
                count: None,
                message: Some(e.to_string()),
            }),
            Err(e) => Err(e),
        }
    }

    /// Current assignments joined with the catalog
    pub fn assignments(&self) -> Result<Vec<DisplayRecord>> {
        let store = self.lock_store()?;
        format_assignments(store.current(), &self.catalog)
    }

    /// Raw snapshot of the stored set
    pub fn snapshot(&self) -> Result<AssignmentSet> {
        Ok(self.lock_store()?.all())
    }

    /// Drop the stored assignments; resetting an empty store also succeeds
    pub fn reset(&self) -> Result<ResetResponse> {
        let mut store = self.lock_store()?;
        store.clear();
        tracing::info!("Assignments reset");
        Ok(ResetResponse { success: true })
    }

    /// Catalog sections matching `filter`, in catalog order
    pub fn sections(&self, filter: &SectionFilter) -> Vec<Section> {
        self.catalog.sections(filter).cloned().collect()
    }

    /// Catalog rooms matching `filter`, in catalog order
    pub fn rooms(&self, filter: &RoomFilter) -> Vec<Room> {
        self.catalog.rooms(filter).cloned().collect()
    }

    /// Sections matching `filter` with their stored room, if any
    pub fn section_overview(&self, filter: &SectionFilter) -> Result<Vec<SectionOverview>> {
        let store = self.lock_store()?;
        section_overview(store.current(), &self.catalog, filter)
    }
}
