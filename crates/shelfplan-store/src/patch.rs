//! Partial-field updates. `None` leaves a field untouched.

use serde::{Deserialize, Serialize};
use shelfplan_ir::{Aisle, AisleProduct, InventoryProduct, Store};
use shelfplan_math::{BoxDims, Rect2};

/// Partial update of a [`Store`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description; `Some(None)` clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    /// New floor colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// New floor width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New floor depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl StorePatch {
    /// Merge into `store`.
    pub fn apply(self, store: &mut Store) {
        if let Some(name) = self.name {
            store.name = name;
        }
        if let Some(description) = self.description {
            store.description = description;
        }
        if let Some(color) = self.color {
            store.color = color;
        }
        if let Some(width) = self.width {
            store.width = width;
        }
        if let Some(depth) = self.depth {
            store.depth = depth;
        }
    }
}

/// Partial update of an [`Aisle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AislePatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New minimum x.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New minimum z.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// New extent along x.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New extent along z.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// New rack height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New shelf count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelves: Option<u32>,
    /// Replacement allocation list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<AisleProduct>>,
}

impl AislePatch {
    /// Patch moving/resizing an aisle to `rect`.
    pub fn rect(rect: Rect2) -> Self {
        Self {
            x: Some(rect.x),
            z: Some(rect.z),
            width: Some(rect.width),
            length: Some(rect.length),
            ..Self::default()
        }
    }

    /// Patch replacing the allocation list.
    pub fn products(products: Vec<AisleProduct>) -> Self {
        Self {
            products: Some(products),
            ..Self::default()
        }
    }

    /// Merge into `aisle`. Fields are copied as given; the shelf count is
    /// not re-derived from a new height unless `shelves` is also set.
    pub fn apply(self, aisle: &mut Aisle) {
        if let Some(name) = self.name {
            aisle.name = name;
        }
        if let Some(x) = self.x {
            aisle.x = x;
        }
        if let Some(z) = self.z {
            aisle.z = z;
        }
        if let Some(width) = self.width {
            aisle.width = width;
        }
        if let Some(length) = self.length {
            aisle.length = length;
        }
        if let Some(height) = self.height {
            aisle.height = height;
        }
        if let Some(shelves) = self.shelves {
            aisle.set_shelves(shelves);
        }
        if let Some(products) = self.products {
            aisle.products = products;
        }
    }
}

/// Partial update of an [`InventoryProduct`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New box dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_dimensions: Option<BoxDims>,
    /// New items per box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_box: Option<u32>,
    /// New label colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    /// New unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_item: Option<f64>,
    /// New stock level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_boxes_stock: Option<u32>,
}

impl ProductPatch {
    /// Patch overwriting every editable field with the values of `product`.
    pub fn from_product(product: &InventoryProduct) -> Self {
        Self {
            name: Some(product.name.clone()),
            sku: Some(product.sku.clone()),
            category: Some(product.category.clone()),
            box_dimensions: Some(product.box_dimensions),
            items_per_box: Some(product.items_per_box),
            label_color: Some(product.label_color.clone()),
            price_per_item: Some(product.price_per_item),
            total_boxes_stock: Some(product.total_boxes_stock),
        }
    }

    /// Merge into `product`.
    pub fn apply(self, product: &mut InventoryProduct) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(dims) = self.box_dimensions {
            product.box_dimensions = dims;
        }
        if let Some(n) = self.items_per_box {
            product.items_per_box = n;
        }
        if let Some(color) = self.label_color {
            product.label_color = color;
        }
        if let Some(price) = self.price_per_item {
            product.price_per_item = price;
        }
        if let Some(stock) = self.total_boxes_stock {
            product.total_boxes_stock = stock;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfplan_ir::NewAisle;

    #[test]
    fn test_aisle_patch_merges_only_given_fields() {
        let mut aisle = NewAisle::from_rect("Aisle 1", Rect2::new(1.0, 2.0, 3.0, 6.0))
            .into_aisle("a1".into(), "s1".into());
        AislePatch::rect(Rect2::new(4.0, 2.0, 3.0, 9.0)).apply(&mut aisle);
        assert_eq!(aisle.rect(), Rect2::new(4.0, 2.0, 3.0, 9.0));
        assert_eq!(aisle.name, "Aisle 1");
        assert_eq!(aisle.shelves, 5);

        AislePatch {
            shelves: Some(40),
            ..AislePatch::default()
        }
        .apply(&mut aisle);
        assert_eq!(aisle.shelves, 10);
    }

    #[test]
    fn test_store_patch_clears_description() {
        let mut store = Store {
            id: "s1".into(),
            owner_id: "u1".into(),
            name: "Shop".into(),
            description: Some("corner shop".into()),
            color: "#fff".into(),
            width: 20.0,
            depth: 10.0,
            created_at: 0,
            updated_at: 0,
        };
        StorePatch {
            description: Some(None),
            width: Some(25.0),
            ..StorePatch::default()
        }
        .apply(&mut store);
        assert_eq!(store.description, None);
        assert_eq!(store.width, 25.0);
        assert_eq!(store.name, "Shop");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ProductPatch {
            total_boxes_stock: Some(12),
            ..ProductPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"totalBoxesStock":12}"#);
    }
}
