//! Query parameter names used inside the grid's request bucket

/// Activates a registered tweak by id.
pub const TWEAK: &str = "_tweak";
/// Requests a 0-based page.
pub const PAGE: &str = "_page";
/// Requests a configured limit.
pub const LIMIT: &str = "_limit";
/// Requests an order as `"<columnId>|<asc|desc>"`.
pub const ORDER: &str = "_order";
/// Stores the rendering template reference.
pub const TEMPLATE: &str = "_template";
/// Clears this grid's session bucket.
pub const RESET: &str = "_reset";
/// Dispatches a registered export by index.
pub const EXPORT: &str = "__export_id";
/// Dispatches a registered mass action by index.
pub const MASS_ACTION: &str = "__action_id";
/// Selects every row matching the current filters for a mass action.
pub const MASS_ACTION_ALL_KEYS: &str = "__action_all_keys";
/// Carries the selected row identities; also the selection column's id.
pub const MASS_ACTION_SELECTION: &str = "__action";
/// Session key holding the active tweak per group.
pub const TWEAKS: &str = "tweaks";
