//! Planner application state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shelfplan_ir::{
    Aisle, AisleId, BoxId, BoxPlacement, InventoryProduct, PlacedBoxOverride, ProductId, Store,
    StoreDocument, UserId,
};
use shelfplan_math::Point3;
use shelfplan_packer::{pack_aisle, BoxKey, RackLayout, RackSpec, ShelfLabel};
use shelfplan_store::PersistenceGateway;
use tracing::{debug, info};

use crate::interaction::HoldState;
use crate::sync::PendingWrite;
use crate::{Result, SessionError};

/// Which view the user is in. Only [`ViewMode::Walk`] is interactive for
/// boxes; leaving it drops whatever is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// 2D floor-plan editor.
    #[default]
    Plan,
    /// 3D overview of the store.
    Overview,
    /// First-person walk with grab/place.
    Walk,
}

/// Everything to draw: visible boxes and shelf labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Packed boxes still in place, followed by manual placements.
    pub boxes: Vec<BoxPlacement>,
    /// Shelf labels of every aisle.
    pub labels: Vec<ShelfLabel>,
}

/// The state of one planning session over one store.
///
/// Owned by the caller and passed by reference to whatever needs it; there
/// is no global instance.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) user_id: UserId,
    pub(crate) store: Store,
    pub(crate) aisles: Vec<Aisle>,
    pub(crate) inventory: BTreeMap<ProductId, InventoryProduct>,
    pub(crate) overrides: Vec<PlacedBoxOverride>,
    pub(crate) picked_up: BTreeSet<BoxId>,
    pub(crate) hold: HoldState,
    pub(crate) selected_aisle: Option<AisleId>,
    pub(crate) view: ViewMode,
    pub(crate) spec: RackSpec,
    pub(crate) outbox: Vec<PendingWrite>,
}

impl Session {
    /// A session over `doc`. Boxes already replaced by an override start
    /// out picked up.
    pub fn from_document(doc: StoreDocument, user_id: impl Into<UserId>, spec: RackSpec) -> Self {
        let picked_up = doc.overrides.iter().map(|o| o.box_id.clone()).collect();
        let inventory = doc
            .inventory
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Self {
            user_id: user_id.into(),
            store: doc.store,
            aisles: doc.aisles,
            inventory,
            overrides: doc.overrides,
            picked_up,
            hold: HoldState::Idle,
            selected_aisle: None,
            view: ViewMode::default(),
            spec,
            outbox: Vec::new(),
        }
    }

    /// Read a store, its aisles, the user's inventory and the store's
    /// overrides from `gateway`.
    pub fn load<G>(gateway: &G, store_id: &str, user_id: &str, spec: RackSpec) -> Result<Self>
    where
        G: PersistenceGateway + ?Sized,
    {
        let store = gateway
            .get_store(store_id)?
            .ok_or_else(|| shelfplan_store::GatewayError::NotFound {
                collection: "store",
                id: store_id.to_string(),
            })?;
        let mut doc = StoreDocument::new(store);
        doc.aisles = gateway.list_aisles(store_id)?;
        doc.inventory = gateway.list_products(user_id)?;
        doc.overrides = gateway.list_overrides(store_id)?;
        info!(
            store = store_id,
            aisles = doc.aisles.len(),
            products = doc.inventory.len(),
            overrides = doc.overrides.len(),
            "loaded store"
        );
        Ok(Self::from_document(doc, user_id, spec))
    }

    /// The current local state as a store document.
    pub fn to_document(&self) -> StoreDocument {
        let mut doc = StoreDocument::new(self.store.clone());
        doc.aisles = self.aisles.clone();
        doc.inventory = self.inventory.values().cloned().collect();
        doc.overrides = self.overrides.clone();
        doc
    }

    /// The store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Aisles of the store, in creation order.
    pub fn aisles(&self) -> &[Aisle] {
        &self.aisles
    }

    /// An aisle by id.
    pub fn aisle(&self, id: &str) -> Option<&Aisle> {
        self.aisles.iter().find(|a| a.id == id)
    }

    pub(crate) fn aisle_mut(&mut self, id: &str) -> Result<&mut Aisle> {
        self.aisles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| SessionError::UnknownAisle(id.to_string()))
    }

    /// Inventory keyed by product id.
    pub fn inventory(&self) -> &BTreeMap<ProductId, InventoryProduct> {
        &self.inventory
    }

    /// Manual placements.
    pub fn overrides(&self) -> &[PlacedBoxOverride] {
        &self.overrides
    }

    /// Ids of packed boxes removed from their computed position.
    pub fn picked_up(&self) -> &BTreeSet<BoxId> {
        &self.picked_up
    }

    /// Rack dimensions used for packing.
    pub fn rack_spec(&self) -> &RackSpec {
        &self.spec
    }

    /// The user acting in this session.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Writes not yet pushed to the gateway.
    pub fn pending(&self) -> &[PendingWrite] {
        &self.outbox
    }

    /// Aisle selected in the plan editor.
    pub fn selected_aisle(&self) -> Option<&Aisle> {
        self.selected_aisle.as_deref().and_then(|id| self.aisle(id))
    }

    /// Select an aisle in the plan editor, or clear the selection.
    pub fn select_aisle(&mut self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) if self.aisle(id).is_none() => {
                Err(SessionError::UnknownAisle(id.to_string()))
            }
            _ => {
                self.selected_aisle = id.map(str::to_string);
                Ok(())
            }
        }
    }

    /// Current view.
    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    /// Switch view. Leaving walk mode drops the held box without placing
    /// it; its source stays excluded until [`Session::reset_all`].
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view == ViewMode::Walk && mode != ViewMode::Walk {
            self.drop_held();
        }
        self.view = mode;
    }

    /// Compose what is on the shelves right now: packed boxes minus those
    /// picked up or replaced by an override, plus every override.
    pub fn scene(&self) -> Scene {
        let taken: BTreeSet<&str> = self
            .picked_up
            .iter()
            .map(String::as_str)
            .chain(self.overrides.iter().map(|o| o.box_id.as_str()))
            .collect();
        let mut scene = Scene::default();
        for aisle in &self.aisles {
            let packed = pack_aisle(aisle, &self.inventory, &self.spec);
            let hidden = hidden_boxes(&aisle.id, &packed.placements, &taken);
            scene.boxes.extend(
                packed
                    .placements
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| !hidden.contains(i))
                    .map(|(_, b)| b),
            );
            scene.labels.extend(packed.labels);
        }
        scene
            .boxes
            .extend(self.overrides.iter().map(PlacedBoxOverride::to_placement));
        scene
    }

    /// Store-space centre of a box, for the renderer. `None` if its aisle
    /// is gone.
    pub fn world_center(&self, placement: &BoxPlacement) -> Option<Point3> {
        let aisle = self.aisle(&placement.aisle_id)?;
        Some(RackLayout::new(&self.spec).world_center(
            aisle,
            placement.unit_index,
            placement.side,
            placement.shelf_level,
            placement.local_x,
            placement.local_z,
            placement.dims(),
        ))
    }
}

/// Indices into one aisle's `packed` boxes that are off their shelf slot.
///
/// A taken id hides the packed box that carries it. Ids that no longer match
/// a packed box, because the product's allocations changed since the box was
/// moved, each hide one other box of the same product and level: the one
/// with the same sequence if it is still showing, else the last one packed.
fn hidden_boxes(
    aisle_id: &str,
    packed: &[BoxPlacement],
    taken: &BTreeSet<&str>,
) -> BTreeSet<usize> {
    let mut hidden: BTreeSet<usize> = packed
        .iter()
        .enumerate()
        .filter(|(_, b)| taken.contains(b.box_id.as_str()))
        .map(|(i, _)| i)
        .collect();
    let live: BTreeSet<&str> = packed.iter().map(|b| b.box_id.as_str()).collect();
    let stale = taken
        .iter()
        .filter(|id| !live.contains(**id))
        .filter_map(|id| BoxKey::parse(id))
        .filter(|key| key.aisle_id == aisle_id);
    for key in stale {
        let showing: Vec<usize> = packed
            .iter()
            .enumerate()
            .filter(|(i, b)| {
                !hidden.contains(i)
                    && b.product_id == key.product_id
                    && b.shelf_level == key.shelf_level
            })
            .map(|(i, _)| i)
            .collect();
        let same_sequence = showing.iter().copied().find(|&i| {
            BoxKey::parse(&packed[i].box_id).is_some_and(|k| k.sequence == key.sequence)
        });
        match same_sequence.or_else(|| showing.last().copied()) {
            Some(i) => {
                hidden.insert(i);
            }
            None => debug!(box_id = %key, "moved box has no packed counterpart"),
        }
    }
    hidden
}
