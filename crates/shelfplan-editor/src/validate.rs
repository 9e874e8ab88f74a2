//! Geometry checks applied before an aisle commit.

use std::fmt;

use shelfplan_ir::{Aisle, Store};
use shelfplan_math::Rect2;

/// Why a proposed aisle rectangle was discarded. These are expected,
/// frequent outcomes of free-form dragging, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// An extent is below the minimum aisle size.
    TooSmall,
    /// The rectangle leaves the store floor.
    OutOfBounds,
    /// The rectangle overlaps the interior of another aisle.
    Overlaps(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooSmall => write!(f, "too small"),
            Rejection::OutOfBounds => write!(f, "outside the store"),
            Rejection::Overlaps(id) => write!(f, "overlaps aisle {id}"),
        }
    }
}

/// Check `rect` against the minimum size, the store floor and every aisle
/// of the same store except `exclude` (the aisle being resized).
pub fn validate_aisle_rect(
    rect: &Rect2,
    min_size: f64,
    store: &Store,
    aisles: &[Aisle],
    exclude: Option<&str>,
) -> Result<(), Rejection> {
    if !rect.is_valid() || rect.width < min_size || rect.length < min_size {
        return Err(Rejection::TooSmall);
    }
    if !rect.within_bounds(store.width, store.depth) {
        return Err(Rejection::OutOfBounds);
    }
    let clash = aisles
        .iter()
        .filter(|a| a.store_id == store.id)
        .filter(|a| exclude != Some(a.id.as_str()))
        .find(|a| a.rect().overlaps(rect));
    match clash {
        Some(other) => Err(Rejection::Overlaps(other.id.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfplan_ir::NewAisle;

    fn store() -> Store {
        Store {
            id: "s1".to_string(),
            owner_id: "u1".to_string(),
            name: "Shop".to_string(),
            description: None,
            color: "#fff".to_string(),
            width: 30.0,
            depth: 20.0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn aisle(id: &str, store_id: &str, rect: Rect2) -> Aisle {
        NewAisle::from_rect(id, rect).into_aisle(id.to_string(), store_id.to_string())
    }

    #[test]
    fn test_overlap_rejected_touching_accepted() {
        let aisles = [aisle("a1", "s1", Rect2::new(0.0, 0.0, 10.0, 10.0))];
        let s = store();
        assert_eq!(
            validate_aisle_rect(&Rect2::new(5.0, 5.0, 10.0, 10.0), 1.0, &s, &aisles, None),
            Err(Rejection::Overlaps("a1".to_string()))
        );
        assert_eq!(
            validate_aisle_rect(&Rect2::new(10.0, 0.0, 10.0, 10.0), 1.0, &s, &aisles, None),
            Ok(())
        );
    }

    #[test]
    fn test_other_store_and_self_ignored() {
        let s = store();
        let aisles = [
            aisle("a1", "elsewhere", Rect2::new(0.0, 0.0, 10.0, 10.0)),
            aisle("a2", "s1", Rect2::new(12.0, 0.0, 4.0, 4.0)),
        ];
        let grown = Rect2::new(12.0, 0.0, 6.0, 4.0);
        assert_eq!(
            validate_aisle_rect(&Rect2::new(1.0, 1.0, 2.0, 2.0), 1.0, &s, &aisles, None),
            Ok(())
        );
        assert!(validate_aisle_rect(&grown, 1.0, &s, &aisles, None).is_err());
        assert_eq!(validate_aisle_rect(&grown, 1.0, &s, &aisles, Some("a2")), Ok(()));
    }

    #[test]
    fn test_size_and_bounds() {
        let s = store();
        assert_eq!(
            validate_aisle_rect(&Rect2::new(0.0, 0.0, 0.5, 4.0), 1.0, &s, &[], None),
            Err(Rejection::TooSmall)
        );
        assert_eq!(
            validate_aisle_rect(&Rect2::new(25.0, 0.0, 6.0, 4.0), 1.0, &s, &[], None),
            Err(Rejection::OutOfBounds)
        );
        assert_eq!(
            validate_aisle_rect(&Rect2::new(0.0, 0.0, 30.0, 20.0), 1.0, &s, &[], None),
            Ok(())
        );
    }
}
