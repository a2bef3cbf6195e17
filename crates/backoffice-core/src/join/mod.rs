//! Client-side joins: denormalising foreign display fields onto records.
//!
//! A [`JoinSpec`] describes a many-to-one reference (`orders.user_id` →
//! `users.full_name`), an [`EmbedSpec`] a one-to-many one (`orders` →
//! `order_items`). Fetching is the client's job; this module only resolves
//! specs over collections that are already in memory.

mod resolve;
mod spec;


pub use resolve::{
    child_filter, embed_children, foreign_collections, group_children, resolve_joins,
    ForeignIndex, ForeignTables, JoinPlan,
};
pub use spec::{presets, EmbedSpec, JoinSpec, DEFAULT_DISPLAY_FIELD, HIERARCHY_SEPARATOR};
