//! Declarative join and embed specifications.

use serde_json::Value;

use crate::record::ID_FIELD;

/// Default foreign field projected by a join.
pub const DEFAULT_DISPLAY_FIELD: &str = "name";

/// Separator between parent and child display names in two-level joins.
pub const HIERARCHY_SEPARATOR: &str = " > ";

/// Many-to-one join: copies a display field of a foreign record onto the
/// local record.
///
/// ```rust
/// use backoffice_core::join::JoinSpec;
///
/// let customer = JoinSpec::new("user_id", "users", "customer_name")
///     .display("full_name")
///     .fallback("Unknown Customer");
/// assert_eq!(customer.foreign_key_field, "id");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    /// Local field holding the foreign key.
    pub local_field: String,
    /// Collection the foreign records live in.
    pub foreign_collection: String,
    /// Foreign field matched against `local_field`.
    pub foreign_key_field: String,
    /// Local field that receives the projected value.
    pub project_as: String,
    /// Foreign field that is projected.
    pub display_field: String,
    /// Value projected when no foreign record matches.
    pub fallback: Option<Value>,
    /// Foreign field pointing at a parent in the same collection.
    pub parent_field: Option<String>,
}

impl JoinSpec {
    /// Joins `local_field` against `foreign_collection.id`, projecting its
    /// `name` into `project_as`.
    pub fn new(
        local_field: impl Into<String>,
        foreign_collection: impl Into<String>,
        project_as: impl Into<String>,
    ) -> Self {
        Self {
            local_field: local_field.into(),
            foreign_collection: foreign_collection.into(),
            foreign_key_field: ID_FIELD.to_string(),
            project_as: project_as.into(),
            display_field: DEFAULT_DISPLAY_FIELD.to_string(),
            fallback: None,
            parent_field: None,
        }
    }

    /// Projects `field` instead of `name`.
    #[must_use]
    pub fn display(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    /// Matches against `field` instead of `id`.
    #[must_use]
    pub fn foreign_key(mut self, field: impl Into<String>) -> Self {
        self.foreign_key_field = field.into();
        self
    }

    /// Projects `value` when nothing matches.
    #[must_use]
    pub fn fallback(mut self, value: impl Into<Value>) -> Self {
        self.fallback = Some(value.into());
        self
    }

    /// Renders `"{parent} > {child}"` when the match has a parent.
    #[must_use]
    pub fn with_parent(mut self, field: impl Into<String>) -> Self {
        self.parent_field = Some(field.into());
        self
    }
}

/// One-to-many embed: attaches the children of a record as an array field.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedSpec {
    /// Collection the children live in.
    pub collection: String,
    /// Child field referencing the parent id.
    pub foreign_key_field: String,
    /// Parent field that receives the children.
    pub embed_as: String,
    /// Joins applied to each child before embedding.
    pub joins: Vec<JoinSpec>,
}

impl EmbedSpec {
    /// Embeds `collection` records whose `foreign_key_field` equals the
    /// parent id as `embed_as`.
    pub fn new(
        collection: impl Into<String>,
        foreign_key_field: impl Into<String>,
        embed_as: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            foreign_key_field: foreign_key_field.into(),
            embed_as: embed_as.into(),
            joins: Vec::new(),
        }
    }

    /// Adds a join applied to every child.
    #[must_use]
    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }
}

/// Joins and embeds used by the shop pages.
pub mod presets {
    use super::{EmbedSpec, JoinSpec};

    /// `products.category_id` → `category_name`, `"Parent > Child"` for
    /// subcategories.
    #[must_use]
    pub fn product_category() -> JoinSpec {
        JoinSpec::new("category_id", "categories", "category_name").with_parent("parent_id")
    }

    /// `orders.user_id` → `customer_name`.
    #[must_use]
    pub fn order_customer() -> JoinSpec {
        JoinSpec::new("user_id", "users", "customer_name")
            .display("full_name")
            .fallback("Unknown Customer")
    }

    /// `order_items.product_id` → `product_name`.
    #[must_use]
    pub fn item_product() -> JoinSpec {
        JoinSpec::new("product_id", "products", "product_name").fallback("Unknown Product")
    }

    /// An order's line items, each with its product name.
    #[must_use]
    pub fn order_items() -> EmbedSpec {
        EmbedSpec::new("order_items", "order_id", "items").join(item_product())
    }

    /// A product's variants.
    #[must_use]
    pub fn product_variants() -> EmbedSpec {
        EmbedSpec::new("product_variants", "product_id", "variants")
    }
}
