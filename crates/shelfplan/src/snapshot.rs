//! Explicit save/restore of a whole session.
//!
//! Nothing is persisted implicitly: a host that wants the session to
//! survive a restart calls [`Session::snapshot`] and stores the JSON
//! wherever it likes.

use serde::{Deserialize, Serialize};
use shelfplan_ir::{AisleId, BoxId, StoreDocument, UserId};
use shelfplan_packer::RackSpec;

use crate::interaction::HoldState;
use crate::sync::PendingWrite;
use crate::{Result, Session, SessionError, ViewMode};

/// Serializable image of a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Format version.
    pub version: String,
    /// Acting user.
    pub user_id: UserId,
    /// Store, aisles, inventory and overrides.
    pub document: StoreDocument,
    /// Packed boxes removed from their computed position.
    #[serde(default)]
    pub picked_up: Vec<BoxId>,
    /// Hand state.
    #[serde(default)]
    pub hold: HoldState,
    /// Current view.
    #[serde(default)]
    pub view: ViewMode,
    /// Aisle selected in the editor.
    #[serde(default)]
    pub selected_aisle: Option<AisleId>,
    /// Writes not yet synced.
    #[serde(default)]
    pub pending: Vec<PendingWrite>,
}

impl SessionSnapshot {
    /// Current format version.
    pub const VERSION: &'static str = "1";

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and version-check a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SessionSnapshot = serde_json::from_str(json)?;
        if snapshot.version != Self::VERSION {
            return Err(SessionError::SnapshotVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

impl Session {
    /// Capture everything needed to resume this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SessionSnapshot::VERSION.to_string(),
            user_id: self.user_id.clone(),
            document: self.to_document(),
            picked_up: self.picked_up.iter().cloned().collect(),
            hold: self.hold.clone(),
            view: self.view,
            selected_aisle: self.selected_aisle.clone(),
            pending: self.outbox.clone(),
        }
    }

    /// Resume a session from a snapshot.
    pub fn restore(snapshot: SessionSnapshot, spec: RackSpec) -> Result<Self> {
        if snapshot.version != SessionSnapshot::VERSION {
            return Err(SessionError::SnapshotVersion(snapshot.version));
        }
        let mut session = Session::from_document(snapshot.document, snapshot.user_id, spec);
        session.picked_up.extend(snapshot.picked_up);
        session.hold = snapshot.hold;
        session.view = snapshot.view;
        session.selected_aisle = snapshot
            .selected_aisle
            .filter(|id| session.aisle(id).is_some());
        session.outbox = snapshot.pending;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfplan_ir::{InventoryProduct, NewAisle, NewStore};
    use shelfplan_math::{BoxDims, Rect2, ShelfLevel};
    use shelfplan_store::{InMemoryGateway, PersistenceGateway};

    fn busy_session() -> Session {
        let mut gw = InMemoryGateway::new();
        let store = gw
            .create_store(
                "u1",
                NewStore {
                    name: "Shop".into(),
                    description: Some("by the station".into()),
                    color: "#fff".into(),
                    width: 20.0,
                    depth: 12.0,
                },
            )
            .unwrap();
        let mut s = Session::load(&gw, &store, "u1", RackSpec::default()).unwrap();
        let product = s
            .save_inventory_product(
                &mut gw,
                InventoryProduct {
                    id: String::new(),
                    user_id: "u1".into(),
                    name: "Tea".into(),
                    sku: "T-9".into(),
                    category: "drinks".into(),
                    box_dimensions: BoxDims::new(0.3, 0.2, 0.2),
                    items_per_box: 20,
                    label_color: "#2e8b57".into(),
                    price_per_item: 4.0,
                    total_boxes_stock: 9,
                },
            )
            .unwrap();
        let aisle = s.add_aisle(NewAisle::from_rect("Aisle 1", Rect2::new(1.0, 1.0, 2.0, 6.0)));
        s.assign_product(&aisle, &product, ShelfLevel::FIRST, 5).unwrap();
        s.select_aisle(Some(&aisle)).unwrap();
        s.set_view_mode(ViewMode::Walk);
        s.grab(&format!("{aisle}:{product}:L1:U0:0")).unwrap();
        let slot = s.vacant_slots(&aisle).unwrap().pop().unwrap();
        s.place(crate::PlaceTarget::from_slot(aisle.clone(), &slot))
            .unwrap();
        s.grab(&format!("{aisle}:{product}:L1:U0:1")).unwrap();
        s
    }

    #[test]
    fn test_snapshot_restores_interaction_state() {
        let session = busy_session();
        let json = session.snapshot().to_json().unwrap();
        let restored =
            Session::restore(SessionSnapshot::from_json(&json).unwrap(), RackSpec::default())
                .unwrap();

        assert_eq!(restored.to_document(), session.to_document());
        assert_eq!(restored.picked_up(), session.picked_up());
        assert_eq!(restored.hold_state(), session.hold_state());
        assert_eq!(restored.view_mode(), ViewMode::Walk);
        assert_eq!(restored.pending(), session.pending());
        assert!(restored.placement_in_flight());
        assert_eq!(
            restored.selected_aisle().map(|a| &a.id),
            session.selected_aisle().map(|a| &a.id)
        );
        assert_eq!(restored.scene(), session.scene());
    }

    #[test]
    fn test_rejects_other_versions() {
        let mut snapshot = busy_session().snapshot();
        snapshot.version = "0".into();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            SessionSnapshot::from_json(&json),
            Err(SessionError::SnapshotVersion(v)) if v == "0"
        ));
        assert!(matches!(
            Session::restore(snapshot, RackSpec::default()),
            Err(SessionError::SnapshotVersion(_))
        ));
        assert!(matches!(
            SessionSnapshot::from_json("{"),
            Err(SessionError::Json(_))
        ));
    }
}
