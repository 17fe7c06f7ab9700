//! Owner partitions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use filevault_entity::LineagePath;

use super::lineage::Lineage;

/// All lineages of one owner.
///
/// Per-lineage operations hold the read lock plus that lineage's mutex.
/// Owner-wide operations hold the write lock, which excludes every
/// per-lineage operation of the same owner for their duration.
#[derive(Debug, Default)]
pub(crate) struct OwnerPartition {
    pub(crate) lineages: RwLock<HashMap<LineagePath, Arc<Mutex<Lineage>>>>,
}

impl OwnerPartition {
    pub(crate) fn from_lineages(lineages: HashMap<LineagePath, Lineage>) -> Self {
        Self {
            lineages: RwLock::new(
                lineages
                    .into_iter()
                    .map(|(path, lineage)| (path, Arc::new(Mutex::new(lineage))))
                    .collect(),
            ),
        }
    }
}
