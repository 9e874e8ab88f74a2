//! Box identity.
//!
//! A packed box has no stored id; its identity is rebuilt from where the
//! packer put it. The same inputs always yield the same ids, so "this box
//! was picked up" survives recomputation. `sequence` counts one product's
//! boxes on one shelf level, across every allocation of that product to the
//! level, so ids stay unique when a product is allocated twice and stay put
//! when a different product's allocation grows or shrinks.
//!
//! Changing the product's own allocations can still move its boxes to other
//! units, which changes their ids. Callers that hold ids across edits match
//! them back by count per aisle, product and level (see [`BoxKey::parse`]).

use std::fmt;

use shelfplan_math::ShelfLevel;

/// Components of a packed box's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxKey<'a> {
    /// Aisle id.
    pub aisle_id: &'a str,
    /// Product id.
    pub product_id: &'a str,
    /// Shelf level.
    pub shelf_level: ShelfLevel,
    /// Rack unit.
    pub unit_index: u32,
    /// Position in this product's packing order on this shelf level.
    pub sequence: u32,
}

impl<'a> BoxKey<'a> {
    /// The string form used as `box_id`.
    pub fn box_id(&self) -> String {
        self.to_string()
    }

    /// Split a `box_id` back into its parts. Aisle ids may contain `:`,
    /// product ids may not. `None` for anything the packer never produced.
    pub fn parse(box_id: &'a str) -> Option<Self> {
        let mut parts = box_id.rsplitn(5, ':');
        let sequence = parts.next()?.parse().ok()?;
        let unit_index = parts.next()?.strip_prefix('U')?.parse().ok()?;
        let level = parts.next()?.strip_prefix('L')?.parse().ok()?;
        let product_id = parts.next()?;
        let aisle_id = parts.next()?;
        Some(BoxKey {
            aisle_id,
            product_id,
            shelf_level: ShelfLevel::new(level)?,
            unit_index,
            sequence,
        })
    }
}

impl fmt::Display for BoxKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:L{}:U{}:{}",
            self.aisle_id, self.product_id, self.shelf_level, self.unit_index, self.sequence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_id_format() {
        let key = BoxKey {
            aisle_id: "a1",
            product_id: "p9",
            shelf_level: ShelfLevel::new(3).unwrap(),
            unit_index: 1,
            sequence: 17,
        };
        assert_eq!(key.box_id(), "a1:p9:L3:U1:17");
    }

    #[test]
    fn test_parse_splits_box_id() {
        let key = BoxKey::parse("store:a1:p9:L3:U1:17").unwrap();
        assert_eq!(key.aisle_id, "store:a1");
        assert_eq!(key.product_id, "p9");
        assert_eq!(key.shelf_level.get(), 3);
        assert_eq!(key.unit_index, 1);
        assert_eq!(key.sequence, 17);

        assert!(BoxKey::parse("missing").is_none());
        assert!(BoxKey::parse("a1:p9:L0:U1:17").is_none());
        assert!(BoxKey::parse("a1:p9:3:U1:17").is_none());
    }
}
