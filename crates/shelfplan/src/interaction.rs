//! Grab, place and reset of individual boxes.
//!
//! `Idle → Holding → Idle`. Local state always changes first; the matching
//! gateway write is queued on the outbox and pushed by [`Session::sync`].

use serde::{Deserialize, Serialize};
use shelfplan_ir::{
    AisleId, AisleProduct, BoxId, BoxPlacement, InventoryProduct, OverrideId, PlacedBoxOverride,
    ProductId, RackSide,
};
use shelfplan_math::{BoxDims, ShelfLevel};
use shelfplan_packer::{find_aisle_vacancies, target_slot, RackLayout, Slot, ViewRay};
use tracing::debug;
use uuid::Uuid;

use crate::sync::PendingWrite;
use crate::{Result, Session, SessionError};

/// The box in hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldBox {
    /// Identity of the packed box it came from.
    pub box_id: BoxId,
    /// Product in the box.
    pub product_id: ProductId,
    /// Box dimensions.
    pub dims: BoxDims,
    /// Label colour.
    pub label_color: String,
    /// Aisle the box was originally packed into.
    pub source_aisle_id: AisleId,
    /// Shelf the box was originally packed onto.
    pub source_shelf_level: ShelfLevel,
}

impl HeldBox {
    fn from_placement(placement: &BoxPlacement) -> Self {
        Self {
            box_id: placement.box_id.clone(),
            product_id: placement.product_id.clone(),
            dims: placement.dims(),
            label_color: placement.label_color.clone(),
            source_aisle_id: placement.aisle_id.clone(),
            source_shelf_level: placement.shelf_level,
        }
    }

    fn from_override(record: &PlacedBoxOverride) -> Self {
        Self {
            box_id: record.box_id.clone(),
            product_id: record.product_id.clone(),
            dims: record.dimensions,
            label_color: record.label_color.clone(),
            source_aisle_id: record.source_aisle_id.clone(),
            source_shelf_level: record.source_shelf_level,
        }
    }
}

/// Whether a box is in hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "box")]
pub enum HoldState {
    /// Nothing held.
    #[default]
    Idle,
    /// One box picked up and not yet placed.
    Holding(HeldBox),
}

/// Where to put the held box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceTarget {
    /// Aisle.
    pub aisle_id: AisleId,
    /// Rack unit.
    pub unit_index: u32,
    /// Rack side.
    pub side: RackSide,
    /// Shelf.
    pub shelf_level: ShelfLevel,
    /// Centre along the shelf front.
    pub local_x: f64,
    /// Centre into the shelf.
    pub local_z: f64,
}

impl PlaceTarget {
    /// Target the centre of a vacant slot.
    pub fn from_slot(aisle_id: impl Into<AisleId>, slot: &Slot) -> Self {
        Self {
            aisle_id: aisle_id.into(),
            unit_index: slot.unit_index,
            side: slot.side,
            shelf_level: slot.shelf_level,
            local_x: slot.local_x,
            local_z: slot.local_z,
        }
    }
}

/// The single slot under the view ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Aisle holding the slot.
    pub aisle_id: AisleId,
    /// The slot.
    pub slot: Slot,
}

impl Target {
    /// This target as a placement request.
    pub fn place_target(&self) -> PlaceTarget {
        PlaceTarget::from_slot(self.aisle_id.clone(), &self.slot)
    }
}

/// Read-only view of a box for the edit panel.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxInspection {
    /// The box as drawn.
    pub placement: BoxPlacement,
    /// Its product, if the reference resolves.
    pub product: Option<InventoryProduct>,
    /// The allocation that packed it; `None` for manual placements.
    pub allocation: Option<AisleProduct>,
    /// The override record, for manual placements.
    pub override_id: Option<OverrideId>,
}

impl Session {
    /// Hand state.
    pub fn hold_state(&self) -> &HoldState {
        &self.hold
    }

    /// The held box, if any.
    pub fn held(&self) -> Option<&HeldBox> {
        match &self.hold {
            HoldState::Holding(held) => Some(held),
            HoldState::Idle => None,
        }
    }

    /// True while a placement has not been pushed by [`Session::sync`].
    /// Further placements are refused until then.
    pub fn placement_in_flight(&self) -> bool {
        self.outbox
            .iter()
            .any(|w| matches!(w, PendingWrite::CreateOverride(_)))
    }

    /// Pick up a visible box. A manual placement is removed and its record
    /// queued for deletion; a packed box is marked picked up.
    pub fn grab(&mut self, box_id: &str) -> Result<&HeldBox> {
        if self.held().is_some() {
            return Err(SessionError::NotIdle);
        }
        let held = if let Some(index) = self.overrides.iter().position(|o| o.box_id == box_id) {
            let record = self.overrides.remove(index);
            self.queue_override_delete(&record.id);
            HeldBox::from_override(&record)
        } else {
            let placement = self
                .scene()
                .boxes
                .into_iter()
                .find(|b| b.box_id == box_id)
                .ok_or_else(|| SessionError::UnknownBox(box_id.to_string()))?;
            HeldBox::from_placement(&placement)
        };
        debug!(box_id, product = %held.product_id, "grabbed box");
        self.picked_up.insert(held.box_id.clone());
        self.hold = HoldState::Holding(held);
        self.held().ok_or(SessionError::NotHolding)
    }

    /// Put the held box down at `target`, creating an override record.
    /// Returns the record's id, local until the next sync.
    pub fn place(&mut self, target: PlaceTarget) -> Result<OverrideId> {
        if self.placement_in_flight() {
            return Err(SessionError::PlacementInFlight);
        }
        let Some(held) = self.held() else {
            return Err(SessionError::NotHolding);
        };
        let aisle = self
            .aisle(&target.aisle_id)
            .ok_or_else(|| SessionError::UnknownAisle(target.aisle_id.clone()))?;
        if target.shelf_level.get() > aisle.shelves {
            return Err(SessionError::NoSuchShelf {
                aisle: aisle.id.clone(),
                level: target.shelf_level.get(),
            });
        }
        if target.unit_index >= RackLayout::new(&self.spec).num_units(aisle) {
            return Err(SessionError::NoSuchUnit {
                aisle: aisle.id.clone(),
                unit: target.unit_index,
            });
        }

        let record = PlacedBoxOverride {
            id: Uuid::new_v4().to_string(),
            box_id: held.box_id.clone(),
            product_id: held.product_id.clone(),
            aisle_id: target.aisle_id,
            unit_index: target.unit_index,
            side: target.side,
            shelf_level: target.shelf_level,
            local_x: target.local_x,
            local_z: target.local_z,
            dimensions: held.dims,
            label_color: held.label_color.clone(),
            source_aisle_id: held.source_aisle_id.clone(),
            source_shelf_level: held.source_shelf_level,
            user_id: self.user_id.clone(),
            store_id: self.store.id.clone(),
        };
        let id = record.id.clone();
        debug!(
            box_id = %record.box_id,
            aisle = %record.aisle_id,
            unit = record.unit_index,
            level = record.shelf_level.get(),
            "placed box"
        );
        self.overrides.push(record);
        self.outbox.push(PendingWrite::CreateOverride(id.clone()));
        self.hold = HoldState::Idle;
        Ok(id)
    }

    /// Let go of the held box without placing it. Its source stays
    /// excluded until [`Session::reset_all`].
    pub fn drop_held(&mut self) -> Option<HeldBox> {
        match std::mem::take(&mut self.hold) {
            HoldState::Holding(held) => {
                debug!(box_id = %held.box_id, "dropped held box");
                Some(held)
            }
            HoldState::Idle => None,
        }
    }

    /// Remove every manual placement of the store and put all packed boxes
    /// back. Valid in any state.
    pub fn reset_all(&mut self) {
        debug!(
            overrides = self.overrides.len(),
            picked_up = self.picked_up.len(),
            "reset all placements"
        );
        self.overrides.clear();
        self.picked_up.clear();
        self.hold = HoldState::Idle;
        self.outbox.retain(|w| !w.touches_overrides());
        self.outbox
            .push(PendingWrite::DeleteAllOverrides(self.store.id.clone()));
    }

    /// Inspect a visible box. Only allowed with an empty hand; changes
    /// nothing.
    pub fn select_box(&self, box_id: &str) -> Result<BoxInspection> {
        if self.held().is_some() {
            return Err(SessionError::NotIdle);
        }
        let placement = self
            .scene()
            .boxes
            .into_iter()
            .find(|b| b.box_id == box_id)
            .ok_or_else(|| SessionError::UnknownBox(box_id.to_string()))?;
        let override_id = self
            .overrides
            .iter()
            .find(|o| o.box_id == box_id)
            .map(|o| o.id.clone());
        let allocation = match override_id {
            Some(_) => None,
            None => self.aisle(&placement.aisle_id).and_then(|aisle| {
                aisle
                    .products_on(placement.shelf_level)
                    .find(|p| p.product_id == placement.product_id)
                    .cloned()
            }),
        };
        Ok(BoxInspection {
            product: self.inventory.get(&placement.product_id).cloned(),
            placement,
            allocation,
            override_id,
        })
    }

    /// Vacant slots in `aisle_id` sized for the held box, both racks.
    pub fn vacant_slots(&self, aisle_id: &str) -> Result<Vec<Slot>> {
        let held = self.held().ok_or(SessionError::NotHolding)?;
        let aisle = self
            .aisle(aisle_id)
            .ok_or_else(|| SessionError::UnknownAisle(aisle_id.to_string()))?;
        let occupied = self.scene().boxes;
        Ok(find_aisle_vacancies(
            &self.spec,
            aisle,
            &occupied,
            held.dims.width,
            held.dims.depth,
        ))
    }

    /// The nearest vacant slot hit by `ray`, across all aisles. `None`
    /// when nothing is held or nothing is hit.
    pub fn target(&self, ray: &ViewRay) -> Option<Target> {
        let held = self.held()?;
        let occupied = self.scene().boxes;
        let layout = RackLayout::new(&self.spec);
        let mut candidates = Vec::new();
        for aisle in &self.aisles {
            for slot in find_aisle_vacancies(
                &self.spec,
                aisle,
                &occupied,
                held.dims.width,
                held.dims.depth,
            ) {
                let volume = layout.slot_volume(aisle, &slot, held.dims.height);
                candidates.push((aisle, slot, volume));
            }
        }
        let index = target_slot(ray, candidates.iter().map(|(_, _, volume)| *volume))?;
        let (aisle, slot, _) = candidates.swap_remove(index);
        Some(Target {
            aisle_id: aisle.id.clone(),
            slot,
        })
    }

    /// Place the held box in the slot under `ray`. No slot targeted is a
    /// no-op returning `Ok(None)`.
    pub fn place_at(&mut self, ray: &ViewRay) -> Result<Option<OverrideId>> {
        if self.held().is_none() {
            return Err(SessionError::NotHolding);
        }
        match self.target(ray) {
            Some(target) => self.place(target.place_target()).map(Some),
            None => Ok(None),
        }
    }
}
