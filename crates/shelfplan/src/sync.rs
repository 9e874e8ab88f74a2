//! Outbox of pending gateway writes.
//!
//! Mutations append here after changing local state. [`Session::sync`]
//! drains the queue in order, once. A failed write is logged and dropped;
//! nothing is rolled back and nothing is retried.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shelfplan_ir::{AisleId, NewAisle, OverrideId, StoreId};
use shelfplan_store::{AislePatch, GatewayError, PersistenceGateway};
use tracing::{debug, warn};

use crate::interaction::HoldState;
use crate::Session;

/// One write waiting for the gateway. Creates name the local record by its
/// client-side id; the record itself is read at sync time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op", content = "args")]
pub enum PendingWrite {
    /// Create the local aisle with this id.
    CreateAisle(AisleId),
    /// Merge a patch into an aisle.
    UpdateAisle(AisleId, AislePatch),
    /// Delete an aisle.
    DeleteAisle(AisleId),
    /// Create the local override with this id.
    CreateOverride(OverrideId),
    /// Delete an override.
    DeleteOverride(OverrideId),
    /// Delete every override of a store.
    DeleteAllOverrides(StoreId),
}

impl PendingWrite {
    fn name(&self) -> &'static str {
        match self {
            PendingWrite::CreateAisle(_) => "create_aisle",
            PendingWrite::UpdateAisle(..) => "update_aisle",
            PendingWrite::DeleteAisle(_) => "delete_aisle",
            PendingWrite::CreateOverride(_) => "create_override",
            PendingWrite::DeleteOverride(_) => "delete_override",
            PendingWrite::DeleteAllOverrides(_) => "delete_all_overrides",
        }
    }

    pub(crate) fn touches_overrides(&self) -> bool {
        matches!(
            self,
            PendingWrite::CreateOverride(_)
                | PendingWrite::DeleteOverride(_)
                | PendingWrite::DeleteAllOverrides(_)
        )
    }

    /// Point a queued aisle write at the gateway id of an aisle created
    /// earlier in the same sync.
    fn follow_aisle_ids(&mut self, ids: &BTreeMap<AisleId, AisleId>) {
        match self {
            PendingWrite::CreateAisle(id) | PendingWrite::DeleteAisle(id) => {
                if let Some(server) = ids.get(id.as_str()) {
                    *id = server.clone();
                }
            }
            PendingWrite::UpdateAisle(id, patch) => {
                if let Some(server) = ids.get(id.as_str()) {
                    for allocation in patch.products.iter_mut().flatten() {
                        allocation.aisle_id = server.clone();
                    }
                    *id = server.clone();
                }
            }
            _ => {}
        }
    }
}

/// Outcome of one [`Session::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Writes sent to the gateway.
    pub attempted: usize,
    /// Writes the gateway failed; logged and dropped.
    pub failed: usize,
}

/// `box_id` with its aisle prefix swapped, if it belongs to `old`.
fn rekey_box_id(box_id: &str, old: &str, new: &str) -> Option<String> {
    let rest = box_id.strip_prefix(old)?;
    rest.starts_with(':').then(|| format!("{new}{rest}"))
}

impl Session {
    /// Push every pending write through `gateway`, in order.
    ///
    /// Created aisles and overrides take the gateway's ids; references held
    /// locally (allocations, box ids, the held box, the selection and later
    /// queued writes) follow. Failures are logged at `warn` and counted.
    pub fn sync<G>(&mut self, gateway: &mut G) -> SyncReport
    where
        G: PersistenceGateway + ?Sized,
    {
        let pending = std::mem::take(&mut self.outbox);
        let mut report = SyncReport::default();
        let mut aisle_ids: BTreeMap<AisleId, AisleId> = BTreeMap::new();

        for mut write in pending {
            write.follow_aisle_ids(&aisle_ids);
            let op = write.name();
            let outcome = match write {
                PendingWrite::CreateAisle(id) => {
                    let Some(fields) = self.aisle(&id).map(|a| NewAisle {
                        name: a.name.clone(),
                        x: a.x,
                        z: a.z,
                        width: a.width,
                        length: a.length,
                        height: a.height,
                        shelves: a.shelves,
                        products: a.products.clone(),
                    }) else {
                        debug!(aisle = %id, "aisle gone before sync");
                        continue;
                    };
                    report.attempted += 1;
                    gateway
                        .create_aisle(&self.store.id, fields)
                        .map(|server| {
                            self.remap_aisle(&id, &server);
                            aisle_ids.insert(id, server);
                        })
                }
                PendingWrite::UpdateAisle(id, patch) => {
                    report.attempted += 1;
                    gateway.update_aisle(&id, patch)
                }
                PendingWrite::DeleteAisle(id) => {
                    report.attempted += 1;
                    gateway.delete_aisle(&id)
                }
                PendingWrite::CreateOverride(id) => {
                    let Some(record) = self.overrides.iter().find(|o| o.id == id).cloned() else {
                        debug!(id = %id, "override gone before sync");
                        continue;
                    };
                    report.attempted += 1;
                    gateway.create_override(record).map(|server| {
                        if let Some(local) = self.overrides.iter_mut().find(|o| o.id == id) {
                            local.id = server;
                        }
                    })
                }
                PendingWrite::DeleteOverride(id) => {
                    report.attempted += 1;
                    gateway.delete_override(&id)
                }
                PendingWrite::DeleteAllOverrides(store_id) => {
                    report.attempted += 1;
                    gateway.delete_all_overrides(&store_id)
                }
            };
            if let Err(err) = outcome {
                report.failed += 1;
                log_failure(op, &err);
            }
        }

        if report.attempted > 0 {
            debug!(attempted = report.attempted, failed = report.failed, "synced");
        }
        report
    }

    /// Queue deletion of an override, or cancel its create if the gateway
    /// has not seen it yet.
    pub(crate) fn queue_override_delete(&mut self, id: &str) {
        let pending_create = self
            .outbox
            .iter()
            .position(|w| matches!(w, PendingWrite::CreateOverride(c) if c == id));
        match pending_create {
            Some(index) => {
                self.outbox.remove(index);
            }
            None => self.outbox.push(PendingWrite::DeleteOverride(id.to_string())),
        }
    }

    /// Queue deletion of an aisle, or drop its create and updates if the
    /// gateway has not seen it yet.
    pub(crate) fn queue_aisle_delete(&mut self, id: &str) {
        let unsynced = self
            .outbox
            .iter()
            .any(|w| matches!(w, PendingWrite::CreateAisle(c) if c == id));
        if unsynced {
            self.outbox.retain(|w| match w {
                PendingWrite::CreateAisle(a) | PendingWrite::UpdateAisle(a, _) => a != id,
                _ => true,
            });
        } else {
            self.outbox.push(PendingWrite::DeleteAisle(id.to_string()));
        }
    }

    pub(crate) fn queue_aisle_patch(&mut self, id: &str, patch: AislePatch) {
        self.outbox
            .push(PendingWrite::UpdateAisle(id.to_string(), patch));
    }

    fn remap_aisle(&mut self, old: &str, new: &str) {
        for aisle in self.aisles.iter_mut().filter(|a| a.id == old) {
            aisle.id = new.to_string();
            for allocation in &mut aisle.products {
                allocation.aisle_id = new.to_string();
            }
        }
        for record in &mut self.overrides {
            if record.aisle_id == old {
                record.aisle_id = new.to_string();
            }
            if record.source_aisle_id == old {
                record.source_aisle_id = new.to_string();
            }
            if let Some(box_id) = rekey_box_id(&record.box_id, old, new) {
                record.box_id = box_id;
            }
        }
        self.picked_up = std::mem::take(&mut self.picked_up)
            .into_iter()
            .map(|b| rekey_box_id(&b, old, new).unwrap_or(b))
            .collect();
        if let HoldState::Holding(held) = &mut self.hold {
            if held.source_aisle_id == old {
                held.source_aisle_id = new.to_string();
            }
            if let Some(box_id) = rekey_box_id(&held.box_id, old, new) {
                held.box_id = box_id;
            }
        }
        if self.selected_aisle.as_deref() == Some(old) {
            self.selected_aisle = Some(new.to_string());
        }
    }
}

fn log_failure(op: &str, err: &GatewayError) {
    warn!(op, error = %err, "persistence write failed; keeping local state");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rekey_box_id() {
        assert_eq!(
            rekey_box_id("abc:p1:L1:U0:3", "abc", "xyz").as_deref(),
            Some("xyz:p1:L1:U0:3")
        );
        assert_eq!(rekey_box_id("abcd:p1:L1:U0:3", "abc", "xyz"), None);
        assert_eq!(rekey_box_id("other:p1:L1:U0:3", "abc", "xyz"), None);
    }

    #[test]
    fn test_pending_write_json_shape() {
        let write = PendingWrite::UpdateAisle("a1".into(), AislePatch::default());
        let json = serde_json::to_string(&write).unwrap();
        assert_eq!(json, r#"{"op":"updateAisle","args":["a1",{}]}"#);
        let back: PendingWrite = serde_json::from_str(&json).unwrap();
        assert_eq!(back, write);
    }
}
