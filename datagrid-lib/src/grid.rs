//! The grid request-handling state machine

use indexmap::IndexMap;
use serde_json::json;
use sha2::Digest;
use sha2::Sha256;
use url::Url;

use crate::action::Export;
use crate::action::MassAction;
use crate::action::MassActionCallback;
use crate::action::RowAction;
use crate::column::Column;
use crate::column::ColumnType;
use crate::column::Columns;
use crate::column::Direction;
use crate::config::GridConfig;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::SourceError;
use crate::error::StateError;
use crate::http::GridServices;
use crate::http::HttpRequest;
use crate::http::Response;
use crate::http::params;
use crate::model::Filter;
use crate::model::FilterData;
use crate::model::Rows;
use crate::model::Value;
use crate::source::DataJunction;
use crate::source::Source;
use crate::tweak::Tweak;
use crate::tweak::TweakEntry;

/// Column id row actions fall back to when no target column is named.
pub const DEFAULT_ACTIONS_COLUMN_ID: &str = "__actions";

/// Prefix marking a named template reference in the session.
const TEMPLATE_MARKER: &str = "__SELF__";

/// A template reference stored with the grid's session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridTemplate {
    /// A structured template known by name; stored with a marker prefix.
    Named(String),
    /// A plain template path, stored verbatim.
    Path(String),
}

/// Per-page limit configuration accepted by [`Grid::set_limits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limits {
    /// A single limit, labeled with its own value.
    Single(u64),
    /// Several limits, each labeled with its own value.
    List(Vec<u64>),
    /// Explicit limit/label pairs.
    Labeled(Vec<(u64, String)>),
}

impl From<u64> for Limits {
    fn from(limit: u64) -> Self {
        Limits::Single(limit)
    }
}

impl From<Vec<u64>> for Limits {
    fn from(limits: Vec<u64>) -> Self {
        Limits::List(limits)
    }
}

impl From<Vec<(u64, String)>> for Limits {
    fn from(limits: Vec<(u64, String)>) -> Self {
        Limits::Labeled(limits)
    }
}

/// A server-side data grid bound to one HTTP request/session cycle.
///
/// A grid is configured with columns, actions, exports, and tweaks, then
/// reconciled against one request with [`handle_request`](Grid::handle_request):
/// query input and session-persisted state are merged, the source is driven
/// to materialize rows, and the resulting state (rows, totals, captured
/// responses) is read back through the accessors.
///
/// # Example
///
/// ```no_run
/// use datagrid_lib::Grid;
/// use datagrid_lib::column::Column;
/// use datagrid_lib::model::Row;
/// use datagrid_lib::source::VectorSource;
/// # use datagrid_lib::http::GridServices;
/// # fn services() -> GridServices { unimplemented!() }
///
/// let mut grid = Grid::new(services(), "items");
/// grid.add_column(Column::new("id", "Id").primary(true));
/// grid.add_column(Column::new("name", "Name"));
/// grid.set_source(Box::new(VectorSource::new(
///     "items",
///     vec![Row::new().set("id", 1i64).set("name", "Contoso")],
/// )))?;
/// # Ok::<(), datagrid_lib::error::Error>(())
/// ```
pub struct Grid {
    services: GridServices,
    id: String,
    hash: Option<String>,
    config: Option<GridConfig>,
    source: Option<Box<dyn Source>>,
    columns: Columns,
    lazy_columns: Vec<(Column, usize)>,
    lazy_hidden: Vec<String>,
    lazy_visible: Vec<String>,
    lazy_visibility: IndexMap<String, bool>,
    persistence: bool,
    route_parameters: IndexMap<String, String>,
    route_url: Option<String>,
    request_route: Option<String>,
    default_order: Option<String>,
    default_filters: IndexMap<String, FilterData>,
    permanent_filters: IndexMap<String, FilterData>,
    limits: IndexMap<u64, String>,
    default_limit: Option<u64>,
    limit: Option<u64>,
    page: i64,
    max_results: Option<u64>,
    prefix_title: String,
    no_data_message: Option<String>,
    no_result_message: Option<String>,
    hide_filters: bool,
    hide_titles: bool,
    data_junction: DataJunction,
    mass_actions: Vec<MassAction>,
    row_actions: Vec<RowAction>,
    exports: Vec<Box<dyn Export>>,
    tweaks: IndexMap<String, TweakEntry>,
    default_tweak: Option<String>,
    actions_column_size: Option<u32>,
    actions_column_title: String,
    rows: Option<Rows>,
    total_count: Option<u64>,
    export_response: Option<Response>,
    mass_action_response: Option<Response>,
    pending_export: Option<usize>,
    is_ready_for_export: bool,
    mass_action_redirect: bool,
    paging_bypass: bool,
    new_session: bool,
    request_handled: bool,
    session_data: serde_json::Map<String, serde_json::Value>,
}

impl Grid {
    /// Creates a grid with the given collaborators and identifier.
    ///
    /// An empty id defers identity to a digest of the controller, columns,
    /// and source, computed when the first request is handled.
    pub fn new(services: GridServices, id: impl Into<String>) -> Self {
        Self {
            services,
            id: id.into(),
            hash: None,
            config: None,
            source: None,
            columns: Columns::new(),
            lazy_columns: Vec::new(),
            lazy_hidden: Vec::new(),
            lazy_visible: Vec::new(),
            lazy_visibility: IndexMap::new(),
            persistence: false,
            route_parameters: IndexMap::new(),
            route_url: None,
            request_route: None,
            default_order: None,
            default_filters: IndexMap::new(),
            permanent_filters: IndexMap::new(),
            limits: IndexMap::new(),
            default_limit: None,
            limit: None,
            page: 0,
            max_results: None,
            prefix_title: String::new(),
            no_data_message: None,
            no_result_message: None,
            hide_filters: false,
            hide_titles: false,
            data_junction: DataJunction::Conjunction,
            mass_actions: Vec::new(),
            row_actions: Vec::new(),
            exports: Vec::new(),
            tweaks: IndexMap::new(),
            default_tweak: None,
            actions_column_size: None,
            actions_column_title: "Actions".to_string(),
            rows: None,
            total_count: None,
            export_response: None,
            mass_action_response: None,
            pending_export: None,
            is_ready_for_export: false,
            mass_action_redirect: false,
            paging_bypass: false,
            new_session: false,
            request_handled: false,
            session_data: serde_json::Map::new(),
        }
    }

    /// Creates a grid holding a static configuration for [`initialize`](Grid::initialize).
    pub fn with_config(services: GridServices, id: impl Into<String>, config: GridConfig) -> Self {
        let mut grid = Self::new(services, id);
        grid.config = Some(config);
        grid
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Applies the stored static configuration.
    ///
    /// A grid without a configuration is left untouched; no collaborator is
    /// called.
    pub fn initialize(&mut self) -> Result<(), Error> {
        let Some(config) = self.config.take() else {
            return Ok(());
        };
        if let Some(persistence) = config.persistence {
            self.persistence = persistence;
        }
        for (name, value) in &config.route_parameters {
            self.route_parameters.insert(name.clone(), value.clone());
        }
        if let Some(route) = &config.route {
            if self.route_url.is_none() {
                self.route_url = Some(self.services.router.generate(route, &self.route_parameters));
            }
        }
        if config.filterable == Some(false) {
            for column in self.columns.iter_mut() {
                column.set_filterable(false);
            }
            for (column, _) in self.lazy_columns.iter_mut() {
                column.set_filterable(false);
            }
        }
        if config.sortable == Some(false) {
            for column in self.columns.iter_mut() {
                column.set_sortable(false);
            }
            for (column, _) in self.lazy_columns.iter_mut() {
                column.set_sortable(false);
            }
        }
        if let Some(source) = config.source {
            if self.source.is_none() {
                self.attach_source(source);
            }
        }
        if let Some(fields) = &config.group_by {
            if let Some(source) = self.source.as_mut() {
                source.group_by(fields);
            }
        }
        if let Some(sort_by) = &config.sort_by {
            let direction = config.order.clone().unwrap_or_default().to_lowercase();
            self.default_order = Some(format!("{sort_by}|{direction}"));
        }
        if let Some(limit) = config.max_per_page {
            self.set_limits(limit)?;
        }
        if let Some(max_results) = config.max_results {
            self.max_results = Some(max_results);
        }
        if let Some(page) = config.page {
            self.set_page(page)?;
        }
        Ok(())
    }

    /// Attaches the source, erring when one is already set.
    pub fn set_source(&mut self, source: Box<dyn Source>) -> Result<(), Error> {
        if self.source.is_some() {
            return Err(ConfigError::SourceAlreadySet.into());
        }
        self.attach_source(source);
        Ok(())
    }

    fn attach_source(&mut self, mut source: Box<dyn Source>) {
        source.initialise();
        source.configure_columns(&mut self.columns);
        self.source = Some(source);
    }

    // =========================================================================
    // Columns management
    // =========================================================================

    /// Buffers a column for insertion at the end of the collection.
    pub fn add_column(&mut self, column: Column) {
        self.add_column_at(column, 0);
    }

    /// Buffers a column for insertion at a 1-based position (0 appends).
    pub fn add_column_at(&mut self, column: Column, position: usize) {
        self.lazy_columns.push((column, position));
    }

    /// Returns a column by id, checking the lazy buffer first.
    pub fn column(&self, id: &str) -> Result<&Column, Error> {
        if let Some((column, _)) = self.lazy_columns.iter().find(|(c, _)| c.id() == id) {
            return Ok(column);
        }
        self.columns
            .get(id)
            .ok_or_else(|| ConfigError::ColumnNotFound(id.to_string()).into())
    }

    /// Returns `true` when a column with the given id is registered.
    pub fn has_column(&self, id: &str) -> bool {
        self.lazy_columns.iter().any(|(c, _)| c.id() == id) || self.columns.has(id)
    }

    /// Replaces the live column collection.
    pub fn set_columns(&mut self, columns: Columns) {
        self.columns = columns;
    }

    /// Returns the live column collection.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Returns the live column collection, mutably.
    pub fn columns_mut(&mut self) -> &mut Columns {
        &mut self.columns
    }

    /// Reorders the live collection; see [`Columns::set_order`].
    pub fn set_columns_order(&mut self, ids: &[&str], keep_others: bool) {
        self.columns.set_order(ids, keep_others);
    }

    /// Hides the given columns when the lazy buffer is flushed.
    pub fn set_hidden_columns<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lazy_hidden = ids.into_iter().map(Into::into).collect();
    }

    /// Makes exactly the given columns visible when the buffer is flushed.
    pub fn set_visible_columns<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lazy_visible = ids.into_iter().map(Into::into).collect();
    }

    /// Overrides visibility to shown for the given columns.
    pub fn show_columns<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.lazy_visibility.insert(id.into(), true);
        }
    }

    /// Overrides visibility to hidden for the given columns.
    pub fn hide_columns<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.lazy_visibility.insert(id.into(), false);
        }
    }

    /// Merges buffered columns and visibility overrides into the collection.
    fn flush_lazy_columns(&mut self) -> Result<(), Error> {
        for (mut column, position) in std::mem::take(&mut self.lazy_columns) {
            let denied = column
                .role()
                .is_some_and(|role| !self.services.authorizer.is_granted(role));
            if denied {
                column.set_visible(false);
            }
            self.columns.insert(column, position)?;
        }
        for id in std::mem::take(&mut self.lazy_hidden) {
            if let Some(column) = self.columns.get_mut(&id) {
                column.set_visible(false);
            }
        }
        let visible = std::mem::take(&mut self.lazy_visible);
        if !visible.is_empty() {
            for column in self.columns.iter_mut() {
                column.set_visible(visible.iter().any(|id| id == column.id()));
            }
        }
        for (id, shown) in std::mem::take(&mut self.lazy_visibility) {
            if let Some(column) = self.columns.get_mut(&id) {
                column.set_visible(shown);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Action, export, and tweak registration
    // =========================================================================

    /// Registers a mass action; silently dropped when its role is denied.
    pub fn add_mass_action(&mut self, action: MassAction) {
        if self.is_granted(action.role()) {
            self.mass_actions.push(action);
        }
    }

    /// Registers a row action; silently dropped when its role is denied.
    pub fn add_row_action(&mut self, action: RowAction) {
        if self.is_granted(action.role()) {
            self.row_actions.push(action);
        }
    }

    /// Registers an export; silently dropped when its role is denied.
    pub fn add_export(&mut self, export: Box<dyn Export>) {
        if self.is_granted(export.role()) {
            self.exports.push(export);
        }
    }

    /// Returns the registered mass actions.
    pub fn mass_actions(&self) -> &[MassAction] {
        &self.mass_actions
    }

    /// Returns the registered row actions.
    pub fn row_actions(&self) -> &[RowAction] {
        &self.row_actions
    }

    /// Returns the registered exports.
    pub fn exports(&self) -> &[Box<dyn Export>] {
        &self.exports
    }

    fn is_granted(&self, role: Option<&str>) -> bool {
        role.map(|r| self.services.authorizer.is_granted(r))
            .unwrap_or(true)
    }

    /// Registers a tweak under an explicit or auto-assigned id.
    ///
    /// Explicit ids may only contain `[0-9a-zA-Z_+-]` characters.
    pub fn add_tweak(
        &mut self,
        title: impl Into<String>,
        tweak: Tweak,
        id: Option<&str>,
        group: Option<&str>,
    ) -> Result<(), Error> {
        if let Some(id) = id {
            let valid = !id.is_empty()
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'));
            if !valid {
                return Err(ConfigError::MalformedTweakId(id.to_string()).into());
            }
        }
        let key = id
            .map(str::to_string)
            .unwrap_or_else(|| self.tweaks.len().to_string());
        self.tweaks.insert(
            key,
            TweakEntry {
                title: title.into(),
                id: id.map(str::to_string),
                group: group.map(str::to_string),
                settings: tweak,
                url: String::new(),
            },
        );
        Ok(())
    }

    /// Returns all registered tweaks with their activation URLs resolved.
    pub fn tweaks(&self) -> IndexMap<String, TweakEntry> {
        self.tweaks
            .iter()
            .map(|(key, entry)| (key.clone(), self.resolve_tweak(key, entry)))
            .collect()
    }

    /// Returns one tweak with its activation URL resolved.
    pub fn tweak(&self, id: &str) -> Result<TweakEntry, Error> {
        let entry = self
            .tweaks
            .get(id)
            .ok_or_else(|| SourceError::TweakNotFound(id.to_string()))?;
        Ok(self.resolve_tweak(id, entry))
    }

    /// Returns the tweaks registered under the given group.
    pub fn tweaks_group(&self, group: &str) -> IndexMap<String, TweakEntry> {
        self.tweaks
            .iter()
            .filter(|(_, entry)| entry.group.as_deref() == Some(group))
            .map(|(key, entry)| (key.clone(), self.resolve_tweak(key, entry)))
            .collect()
    }

    /// Returns the active tweak id recorded for each group this request.
    pub fn active_tweaks(&self) -> IndexMap<String, String> {
        self.session_data
            .get(params::TWEAKS)
            .and_then(serde_json::Value::as_object)
            .map(|groups| {
                groups
                    .iter()
                    .filter_map(|(group, id)| id.as_str().map(|id| (group.clone(), id.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the active tweak id for the given group, if one is recorded.
    /// Tweaks registered without a group live under the empty group.
    pub fn active_tweak_group(&self, group: &str) -> Option<String> {
        self.session_data
            .get(params::TWEAKS)
            .and_then(serde_json::Value::as_object)
            .and_then(|groups| groups.get(group))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    }

    /// Applies a tweak automatically on new sessions.
    pub fn set_default_tweak(&mut self, id: impl Into<String>) {
        self.default_tweak = Some(id.into());
    }

    fn resolve_tweak(&self, key: &str, entry: &TweakEntry) -> TweakEntry {
        let mut resolved = entry.clone();
        let base = self.route_url().unwrap_or_default();
        let separator = if base.contains('?') { '&' } else { '?' };
        resolved.url = format!("{base}{separator}[{}]={key}", params::TWEAK);
        resolved
    }

    // =========================================================================
    // Configuration setters
    // =========================================================================

    /// Sets the grid id used for session identity.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Returns the grid id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the session hash, unset until a request materializes it.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Keeps session state across navigation away from the grid.
    pub fn set_persistence(&mut self, persistence: bool) {
        self.persistence = persistence;
    }

    /// Returns the persistence flag.
    pub fn is_persisted(&self) -> bool {
        self.persistence
    }

    /// Sets the grid URL explicitly.
    pub fn set_route_url(&mut self, url: impl Into<String>) {
        self.route_url = Some(url.into());
    }

    /// Adds a parameter used when the grid URL is generated from a route.
    pub fn add_route_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.route_parameters.insert(name.into(), value.into());
    }

    /// Returns the grid URL.
    ///
    /// Falls back to generating from the route captured off the last
    /// request when no explicit URL was set.
    pub fn route_url(&self) -> Option<String> {
        if let Some(url) = &self.route_url {
            return Some(url.clone());
        }
        self.request_route
            .as_ref()
            .map(|route| self.services.router.generate(route, &self.route_parameters))
    }

    /// Sets the default order as column id plus direction, lowercased.
    pub fn set_default_order(&mut self, column_id: impl Into<String>, direction: impl Into<String>) {
        let direction = direction.into().to_lowercase();
        self.default_order = Some(format!("{}|{direction}", column_id.into()));
    }

    /// Returns the stored default order.
    pub fn default_order(&self) -> Option<&str> {
        self.default_order.as_deref()
    }

    /// Sets default filters applied to fresh sessions.
    pub fn set_default_filters<I, K, V>(&mut self, filters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterData>,
    {
        self.default_filters = filters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Sets permanent filters that request input cannot override.
    pub fn set_permanent_filters<I, K, V>(&mut self, filters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FilterData>,
    {
        self.permanent_filters = filters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    /// Configures the selectable per-page limits.
    pub fn set_limits(&mut self, limits: impl Into<Limits>) -> Result<(), Error> {
        let entries: Vec<(u64, String)> = match limits.into() {
            Limits::Single(limit) => vec![(limit, limit.to_string())],
            Limits::List(limits) => limits.into_iter().map(|l| (l, l.to_string())).collect(),
            Limits::Labeled(pairs) => pairs,
        };
        if entries.is_empty() || entries.iter().any(|(limit, _)| *limit == 0) {
            return Err(ConfigError::InvalidLimits.into());
        }
        for (limit, label) in entries {
            self.limits.insert(limit, label);
        }
        Ok(())
    }

    /// Returns the configured limits.
    pub fn limits(&self) -> &IndexMap<u64, String> {
        &self.limits
    }

    /// Sets the default limit, validated against `limits` at request time.
    pub fn set_default_limit(&mut self, limit: u64) {
        self.default_limit = Some(limit);
    }

    /// Sets the current 0-based page; negative values error.
    pub fn set_page(&mut self, page: i64) -> Result<(), Error> {
        if page < 0 {
            return Err(ConfigError::InvalidPage(page).into());
        }
        self.page = page;
        Ok(())
    }

    /// Stores the 1-based default page, validated at request time.
    pub fn set_default_page(&mut self, page: i64) {
        self.page = page - 1;
    }

    /// Returns the current 0-based page.
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Returns the current limit; 0 means all rows.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Caps the number of rows considered; `None` clears the cap.
    pub fn set_max_results(&mut self, max_results: Option<u64>) {
        self.max_results = max_results;
    }

    /// Returns the row cap.
    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    /// Sets how multiple active filters combine.
    pub fn set_data_junction(&mut self, junction: DataJunction) {
        self.data_junction = junction;
    }

    /// Returns the filter combination mode.
    pub fn data_junction(&self) -> DataJunction {
        self.data_junction
    }

    /// Prefixes every column title for rendering.
    pub fn set_prefix_title(&mut self, prefix: impl Into<String>) {
        self.prefix_title = prefix.into();
    }

    /// Returns the title prefix.
    pub fn prefix_title(&self) -> &str {
        &self.prefix_title
    }

    /// Message shown when the source holds no data at all.
    pub fn set_no_data_message(&mut self, message: impl Into<String>) {
        self.no_data_message = Some(message.into());
    }

    /// Returns the no-data message.
    pub fn no_data_message(&self) -> Option<&str> {
        self.no_data_message.as_deref()
    }

    /// Message shown when filters match nothing.
    pub fn set_no_result_message(&mut self, message: impl Into<String>) {
        self.no_result_message = Some(message.into());
    }

    /// Returns the no-result message.
    pub fn no_result_message(&self) -> Option<&str> {
        self.no_result_message.as_deref()
    }

    /// Hides the filter row.
    pub fn hide_filters(&mut self) {
        self.hide_filters = true;
    }

    /// Hides the title row.
    pub fn hide_titles(&mut self) {
        self.hide_titles = true;
    }

    /// Sets the rendered width of synthesized actions columns.
    pub fn set_actions_column_size(&mut self, size: u32) {
        self.actions_column_size = Some(size);
    }

    /// Sets the title of synthesized actions columns.
    pub fn set_actions_column_title(&mut self, title: impl Into<String>) {
        self.actions_column_title = title.into();
    }

    /// Stores a template reference in the session-data accumulator.
    ///
    /// The accumulated state is written through to the session immediately
    /// when the grid's hash can already be derived from an explicit id.
    pub fn set_template(&mut self, template: GridTemplate) {
        let value = match template {
            GridTemplate::Named(name) => format!("{TEMPLATE_MARKER}{name}"),
            GridTemplate::Path(path) => path,
        };
        self.session_data
            .insert(params::TEMPLATE.to_string(), json!(value));
        if self.hash.is_none() && !self.id.is_empty() {
            self.hash = Some(format!("grid_{}", self.id));
        }
        if let Some(hash) = self.hash.clone() {
            self.save_session(&hash);
        }
    }

    /// Returns the stored template reference.
    pub fn template(&self) -> Option<String> {
        self.session_data.get(params::TEMPLATE).and_then(json_string)
    }

    // =========================================================================
    // Request reconciliation
    // =========================================================================

    /// Reconciles the grid against one request.
    ///
    /// Runs the full state machine: session identity and reset detection,
    /// mass action and export dispatch, paging/order/limit/filter merge from
    /// query and session, lazy configuration validation, tweak application,
    /// row materialization with a single page-overshoot retry, column
    /// post-processing, select-filter population, totals, and session
    /// persistence. Invoked at most once per request.
    pub fn handle_request(&mut self, request: &dyn HttpRequest) -> Result<(), Error> {
        if self.source.is_none() {
            return Err(StateError::SourceNotSet.into());
        }
        self.flush_lazy_columns()?;
        if self.request_route.is_none() {
            self.request_route = request.attribute("_route");
        }
        let hash = self.create_hash(request);
        let bucket = request
            .parameter(&hash)
            .unwrap_or(serde_json::Value::Null);
        self.process_persistence(request, &hash, &bucket);
        let stored = self.services.session.get(&hash);
        self.new_session = stored.is_none();
        self.session_data = stored
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();

        if let Some(query) = bucket.as_object().filter(|q| !q.is_empty()) {
            let mass_processed = self.process_mass_action(query)?;
            let bypassed = self.process_export(query)? || self.process_tweak(query)?;
            if !bypassed && !mass_processed {
                self.process_query(query)?;
            }
        }
        if self.new_session {
            self.apply_default_session_data()?;
        }
        self.validate_configuration()?;
        self.process_session_data()?;
        self.apply_permanent_filters();
        self.prepare()?;
        self.run_pending_export();
        self.save_session(&hash);
        self.request_handled = true;
        Ok(())
    }

    fn create_hash(&mut self, request: &dyn HttpRequest) -> String {
        let hash = if self.id.is_empty() {
            let controller = request.attribute("_controller").unwrap_or_default();
            let source_hash = self
                .source
                .as_ref()
                .map(|s| s.hash())
                .unwrap_or_default();
            let mut hasher = Sha256::new();
            hasher.update(controller.as_bytes());
            hasher.update(self.columns.hash().as_bytes());
            hasher.update(source_hash.as_bytes());
            let digest = hasher.finalize();
            let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
            format!("grid_{hex}")
        } else {
            format!("grid_{}", self.id)
        };
        self.hash = Some(hash.clone());
        hash
    }

    /// Clears the session bucket on an explicit reset or when a non-XHR
    /// request reaches a non-persisted grid from a different page.
    fn process_persistence(
        &mut self,
        request: &dyn HttpRequest,
        hash: &str,
        bucket: &serde_json::Value,
    ) {
        let reset_requested = bucket
            .get(params::RESET)
            .map(json_truthy)
            .unwrap_or(false);
        if reset_requested {
            self.services.session.remove(hash);
            return;
        }
        if request.is_xml_http_request() || self.persistence {
            return;
        }
        let grid_url = format!(
            "{}://{}{}{}",
            request.scheme(),
            request.http_host(),
            request.base_url(),
            request.path_info()
        );
        let referer = request.header("referer").unwrap_or_default();
        let referer_base = match Url::parse(&referer) {
            Ok(mut url) => {
                url.set_query(None);
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) => referer
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        if referer_base.trim_end_matches('/') != grid_url.trim_end_matches('/') {
            self.services.session.remove(hash);
        }
    }

    fn process_mass_action(
        &mut self,
        query: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<bool, Error> {
        let Some(index) = query.get(params::MASS_ACTION).and_then(json_usize) else {
            return Ok(false);
        };
        let all_keys = query
            .get(params::MASS_ACTION_ALL_KEYS)
            .map(json_truthy)
            .unwrap_or(false);
        let ids = if all_keys {
            Vec::new()
        } else {
            query
                .get(params::MASS_ACTION_SELECTION)
                .map(json_value_list)
                .unwrap_or_default()
        };
        self.dispatch_mass_action(index, all_keys, ids)?;
        Ok(true)
    }

    fn dispatch_mass_action(
        &mut self,
        index: usize,
        all_keys: bool,
        ids: Vec<Value>,
    ) -> Result<(), Error> {
        let Some(action) = self.mass_actions.get(index).cloned() else {
            return Err(SourceError::MassActionNotDefined(index).into());
        };
        if all_keys {
            self.limit = Some(0);
            self.paging_bypass = true;
        }
        match action.callback() {
            Some(MassActionCallback::Inline(callback)) => {
                if let Some(response) = callback(&ids, &*self) {
                    self.mass_action_response = Some(response);
                    self.mass_action_redirect = true;
                }
            }
            Some(MassActionCallback::Controller(target)) => {
                if !target.contains(':') {
                    return Err(SourceError::CallbackNotCallable(target.clone()).into());
                }
                let Some(dispatcher) = self.services.dispatcher.clone() else {
                    return Err(SourceError::DispatcherMissing(target.clone()).into());
                };
                let mut parameters = action.parameters().clone();
                parameters.insert(
                    "primaryKeys".to_string(),
                    serde_json::to_value(&ids).unwrap_or(serde_json::Value::Null),
                );
                parameters.insert(
                    "allPrimaryKeys".to_string(),
                    serde_json::Value::Bool(all_keys),
                );
                let response = dispatcher.forward(target, parameters);
                self.mass_action_response = Some(response);
                self.mass_action_redirect = true;
            }
            None => {
                return Err(SourceError::CallbackNotCallable(action.title().to_string()).into());
            }
        }
        self.page = 0;
        self.session_data.insert(params::PAGE.to_string(), json!(0));
        Ok(())
    }

    fn process_export(
        &mut self,
        query: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<bool, Error> {
        let Some(index) = query.get(params::EXPORT).and_then(json_usize) else {
            return Ok(false);
        };
        self.request_export(index)?;
        Ok(true)
    }

    /// Validates the export reference and forces the all-rows paging mode;
    /// the export itself runs once rows are materialized.
    fn request_export(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.exports.len() {
            return Err(SourceError::ExportNotDefined(index).into());
        }
        self.is_ready_for_export = true;
        self.page = 0;
        self.limit = Some(0);
        self.paging_bypass = true;
        self.pending_export = Some(index);
        Ok(())
    }

    fn process_tweak(
        &mut self,
        query: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<bool, Error> {
        let Some(id) = query.get(params::TWEAK).and_then(json_string) else {
            return Ok(false);
        };
        self.apply_tweak(&id)?;
        Ok(true)
    }

    fn apply_tweak(&mut self, id: &str) -> Result<(), Error> {
        let Some(entry) = self.tweaks.get(id).cloned() else {
            return Err(SourceError::TweakNotFound(id.to_string()).into());
        };
        if entry.settings.reset {
            if let Some(hash) = self.hash.clone() {
                self.services.session.remove(&hash);
            }
            self.session_data.clear();
            return Ok(());
        }
        let group = entry.group.clone().unwrap_or_default();
        let mut groups = self
            .session_data
            .get(params::TWEAKS)
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        groups.insert(group, json!(id));
        self.session_data
            .insert(params::TWEAKS.to_string(), serde_json::Value::Object(groups));
        for (column_id, data) in &entry.settings.filters {
            let select = self.is_select_column(column_id);
            self.insert_session_filter(column_id, data.clone().normalized(select));
        }
        if let Some(order) = &entry.settings.order {
            self.session_data
                .insert(params::ORDER.to_string(), json!(order));
        }
        if let Some(page) = entry.settings.page {
            self.session_data
                .insert(params::PAGE.to_string(), json!(page));
        }
        if let Some(limit) = entry.settings.limit {
            self.session_data
                .insert(params::LIMIT.to_string(), json!(limit));
        }
        if let Some(index) = entry.settings.mass_action {
            self.dispatch_mass_action(index, false, Vec::new())?;
        }
        if let Some(index) = entry.settings.export {
            self.request_export(index)?;
        }
        Ok(())
    }

    fn process_query(
        &mut self,
        query: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), Error> {
        let mut filters_present = false;
        for (key, value) in query {
            if is_control_key(key) || !self.columns.has(key) {
                continue;
            }
            if let Some(data) = filter_data_from_json(value) {
                let select = self.is_select_column(key);
                self.insert_session_filter(key, data.normalized(select));
            } else {
                self.session_data.remove(key.as_str());
            }
            filters_present = true;
        }
        // The presence of the order key resets paging even when its value
        // is not applicable.
        let mut page_reset = filters_present;
        if let Some(order_raw) = query.get(params::ORDER).and_then(json_string) {
            page_reset = true;
            if let Some((column_id, direction)) = order_raw.split_once('|') {
                let sortable = self
                    .columns
                    .get(column_id)
                    .is_some_and(Column::is_sortable);
                if sortable && Direction::parse(direction).is_some() {
                    self.session_data
                        .insert(params::ORDER.to_string(), json!(order_raw));
                }
            }
        }
        if page_reset {
            self.session_data.insert(params::PAGE.to_string(), json!(0));
        } else if let Some(page) = query.get(params::PAGE).and_then(json_i64) {
            if page < 0 {
                return Err(ConfigError::InvalidPage(page).into());
            }
            self.session_data
                .insert(params::PAGE.to_string(), json!(page));
        }
        if let Some(limit) = query.get(params::LIMIT).and_then(json_u64) {
            if self.limits.contains_key(&limit) {
                self.session_data
                    .insert(params::LIMIT.to_string(), json!(limit));
            }
        }
        Ok(())
    }

    /// Seeds a fresh session with the configured defaults. Request-supplied
    /// entries are never overwritten.
    fn apply_default_session_data(&mut self) -> Result<(), Error> {
        for (column_id, data) in self.default_filters.clone() {
            if self.session_data.contains_key(&column_id) {
                continue;
            }
            let select = self
                .columns
                .get(&column_id)
                .ok_or_else(|| ConfigError::ColumnNotFound(column_id.clone()))?
                .column_type()
                == ColumnType::Select;
            self.insert_session_filter(&column_id, data.normalized(select));
        }
        if let Some(order) = self.default_order.clone() {
            if !self.session_data.contains_key(params::ORDER) {
                self.session_data
                    .insert(params::ORDER.to_string(), json!(order));
            }
        }
        if let Some(limit) = self.default_limit {
            if !self.session_data.contains_key(params::LIMIT) {
                self.session_data
                    .insert(params::LIMIT.to_string(), json!(limit));
            }
        }
        if let Some(tweak_id) = self.default_tweak.clone() {
            self.apply_tweak(&tweak_id)?;
        }
        Ok(())
    }

    fn validate_configuration(&self) -> Result<(), Error> {
        if self.page < 0 {
            return Err(ConfigError::InvalidPage(self.page).into());
        }
        if let Some(limit) = self.default_limit {
            if !self.limits.contains_key(&limit) {
                return Err(ConfigError::LimitNotDefined(limit).into());
            }
        }
        Ok(())
    }

    /// Applies the accumulated session data to the grid state and columns.
    fn process_session_data(&mut self) -> Result<(), Error> {
        if let Some(order_raw) = self.session_data.get(params::ORDER).and_then(json_string) {
            if let Some((column_id, direction_raw)) = order_raw.split_once('|') {
                let direction = Direction::parse(direction_raw)
                    .ok_or_else(|| ConfigError::InvalidOrder(direction_raw.to_string()))?;
                let column = self
                    .columns
                    .get_mut(column_id)
                    .ok_or_else(|| ConfigError::ColumnNotFound(column_id.to_string()))?;
                column.set_order(direction);
            }
        }
        if !self.paging_bypass {
            if let Some(page) = self.session_data.get(params::PAGE).and_then(json_i64) {
                if page < 0 {
                    return Err(ConfigError::InvalidPage(page).into());
                }
                self.page = page;
            }
            if let Some(limit) = self.session_data.get(params::LIMIT).and_then(json_u64) {
                if self.limits.contains_key(&limit) {
                    self.limit = Some(limit);
                }
            }
        }
        let filters: Vec<(String, serde_json::Value)> = self
            .session_data
            .iter()
            .filter(|(key, _)| !is_control_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (column_id, value) in filters {
            let select = self.is_select_column(&column_id);
            if let Some(column) = self.columns.get_mut(&column_id) {
                if let Some(data) = filter_data_from_json(&value) {
                    column.set_data(data.normalized(select));
                }
            }
        }
        Ok(())
    }

    fn apply_permanent_filters(&mut self) {
        for (column_id, data) in self.permanent_filters.clone() {
            let select = self.is_select_column(&column_id);
            if let Some(column) = self.columns.get_mut(&column_id) {
                column.set_data(data.normalized(select));
            }
        }
    }

    /// Materializes rows and finalizes columns and totals.
    fn prepare(&mut self) -> Result<(), Error> {
        let mut rows = self.materialize()?;
        let primary_id = self.columns.primary()?.id().to_string();
        for row in rows.iter_mut() {
            row.set_primary_field(primary_id.as_str());
        }
        if !self.row_actions.is_empty() {
            self.attach_row_actions()?;
        }
        if !self.mass_actions.is_empty() && !self.columns.has(params::MASS_ACTION_SELECTION) {
            let selector = match self.columns.extension_for_type(ColumnType::MassAction.as_str()) {
                Some(prototype) => prototype.clone().with_id(params::MASS_ACTION_SELECTION),
                None => Column::mass_action_selector(params::MASS_ACTION_SELECTION),
            };
            self.columns.insert(selector, 1)?;
        }
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Err(StateError::SourceNotSet.into()),
        };
        if source.is_data_loaded() {
            source.populate_select_filters_from_data(&mut self.columns);
            self.total_count = Some(source.total_count_from_data()?);
        } else {
            source.populate_select_filters(&mut self.columns);
            self.total_count = Some(source.total_count()?);
        }
        self.rows = Some(rows);
        Ok(())
    }

    /// Runs the query, retrying once at page 0 when a stale page number
    /// overshoots the available data.
    fn materialize(&mut self) -> Result<Rows, Error> {
        let page = self.page.max(0) as usize;
        let limit = self.limit.unwrap_or(0) as usize;
        let max_results = self.max_results;
        let junction = self.data_junction;
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Err(StateError::SourceNotSet.into()),
        };
        let rows = if source.is_data_loaded() {
            source.execute_from_data(&self.columns, page, limit, max_results)?
        } else {
            source.execute(&self.columns, page, limit, max_results, junction)?
        };
        if !rows.is_empty() || page == 0 {
            return Ok(rows);
        }
        self.page = 0;
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Err(StateError::SourceNotSet.into()),
        };
        let rows = if source.is_data_loaded() {
            source.execute_from_data(&self.columns, 0, limit, max_results)?
        } else {
            source.execute(&self.columns, 0, limit, max_results, junction)?
        };
        Ok(rows)
    }

    fn attach_row_actions(&mut self) -> Result<(), Error> {
        let mut grouped: IndexMap<String, Vec<RowAction>> = IndexMap::new();
        for action in &self.row_actions {
            let column_id = action
                .column()
                .unwrap_or(DEFAULT_ACTIONS_COLUMN_ID)
                .to_string();
            grouped.entry(column_id).or_default().push(action.clone());
        }
        for (column_id, actions) in grouped {
            if let Some(column) = self.columns.get_mut(&column_id) {
                column.set_row_actions(actions);
            } else {
                let primary_index = self
                    .columns
                    .position_of(self.columns.primary()?.id())
                    .unwrap_or(0);
                let mut column = match self.columns.extension_for_type(ColumnType::Actions.as_str())
                {
                    Some(prototype) => {
                        let mut column = prototype.clone().with_id(column_id);
                        column.set_row_actions(actions);
                        column
                    }
                    None => Column::actions(column_id, self.actions_column_title.clone(), actions),
                };
                if let Some(size) = self.actions_column_size {
                    column = column.with_size(size);
                }
                self.columns.insert(column, primary_index + 2)?;
            }
        }
        Ok(())
    }

    fn run_pending_export(&mut self) {
        if let Some(index) = self.pending_export.take() {
            let mut export = self.exports.remove(index);
            export.compute_data(&*self);
            self.export_response = Some(export.response());
            self.exports.insert(index, export);
        }
    }

    fn save_session(&mut self, hash: &str) {
        if !self.session_data.is_empty() {
            self.services
                .session
                .set(hash, serde_json::Value::Object(self.session_data.clone()));
        }
    }

    fn is_select_column(&self, column_id: &str) -> bool {
        self.columns
            .get(column_id)
            .map(|c| c.column_type() == ColumnType::Select)
            .unwrap_or(false)
    }

    fn insert_session_filter(&mut self, column_id: &str, data: FilterData) {
        if data.is_empty() {
            self.session_data.remove(column_id);
        } else {
            self.session_data.insert(
                column_id.to_string(),
                serde_json::to_value(&data).unwrap_or(serde_json::Value::Null),
            );
        }
    }

    // =========================================================================
    // Post-request state
    // =========================================================================

    /// Returns the materialized rows.
    pub fn rows(&self) -> Result<&Rows, Error> {
        self.rows
            .as_ref()
            .ok_or_else(|| StateError::NoRequestHandled.into())
    }

    /// Returns the total number of rows matching the active filters.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Returns the number of pages at the current limit, at least 1.
    pub fn page_count(&self) -> u64 {
        let total = self.total_count.unwrap_or(0);
        match self.limit {
            Some(limit) if limit > 0 => total.div_ceil(limit).max(1),
            _ => 1,
        }
    }

    /// Returns `true` when paging is worth rendering: limits are configured
    /// and the smallest one is below the total.
    pub fn is_pager_section_visible(&self) -> bool {
        let Some(smallest) = self.limits.keys().min().copied() else {
            return false;
        };
        smallest < self.total_count.unwrap_or(0)
    }

    /// Returns the applied filters per column id.
    pub fn filters(&self) -> Result<IndexMap<String, Filter>, Error> {
        if !self.request_handled {
            return Err(StateError::NoRequestHandled.into());
        }
        let mut filters = IndexMap::new();
        for column in self.columns.iter() {
            if let Some(data) = column.data() {
                filters.insert(
                    column.id().to_string(),
                    data.clone().into_filter(column.default_operator()),
                );
            }
        }
        Ok(filters)
    }

    /// Returns the applied filter for one column, if any.
    pub fn filter(&self, column_id: &str) -> Result<Option<Filter>, Error> {
        if !self.request_handled {
            return Err(StateError::NoRequestHandled.into());
        }
        Ok(self.columns.get(column_id).and_then(|column| {
            column
                .data()
                .cloned()
                .map(|data| data.into_filter(column.default_operator()))
        }))
    }

    /// Returns `true` when the column carries an applied filter.
    pub fn has_filter(&self, column_id: &str) -> Result<bool, Error> {
        Ok(self.filter(column_id)?.is_some())
    }

    /// Returns `true` when any column carries filter data.
    pub fn is_filtered(&self) -> bool {
        self.columns.iter().any(Column::is_filtered)
    }

    /// Returns `true` when the title row should render.
    pub fn is_title_section_visible(&self) -> bool {
        !self.hide_titles && self.columns.iter_visible().any(|c| !c.title().is_empty())
    }

    /// Returns `true` when the filter row should render.
    pub fn is_filter_section_visible(&self) -> bool {
        !self.hide_filters
            && self.columns.iter_visible().any(|c| {
                c.is_filterable()
                    && c.column_type() != ColumnType::Actions
                    && c.column_type() != ColumnType::MassAction
            })
    }

    /// Extracts rows as field maps, over the visible columns by default.
    pub fn raw_data(&self, column_ids: Option<&[&str]>) -> Result<Vec<IndexMap<String, Value>>, Error> {
        let rows = self.rows()?;
        let ids = self.raw_column_ids(column_ids);
        Ok(rows
            .iter()
            .map(|row| {
                ids.iter()
                    .map(|id| (id.clone(), row.field(id).clone()))
                    .collect()
            })
            .collect())
    }

    /// Extracts rows as positional value lists, over the visible columns by
    /// default.
    pub fn raw_values(&self, column_ids: Option<&[&str]>) -> Result<Vec<Vec<Value>>, Error> {
        let rows = self.rows()?;
        let ids = self.raw_column_ids(column_ids);
        Ok(rows
            .iter()
            .map(|row| ids.iter().map(|id| row.field(id).clone()).collect())
            .collect())
    }

    fn raw_column_ids(&self, column_ids: Option<&[&str]>) -> Vec<String> {
        match column_ids {
            Some(ids) => ids.iter().map(|id| id.to_string()).collect(),
            None => self
                .columns
                .iter_visible()
                .map(|c| c.id().to_string())
                .collect(),
        }
    }

    /// Deletes rows by identity through the source.
    pub fn delete_action(&mut self, ids: &[Value]) -> Result<(), Error> {
        let source = match self.source.as_mut() {
            Some(source) => source,
            None => return Err(StateError::SourceNotSet.into()),
        };
        source.delete(ids)?;
        Ok(())
    }

    /// Returns the response captured from a dispatched export.
    pub fn export_response(&self) -> Option<&Response> {
        self.export_response.as_ref()
    }

    /// Returns the response captured from a mass action callback.
    pub fn mass_action_response(&self) -> Option<&Response> {
        self.mass_action_response.as_ref()
    }

    /// Returns `true` when this request dispatched an export.
    pub fn is_ready_for_export(&self) -> bool {
        self.is_ready_for_export
    }

    /// Returns `true` when a mass action captured a redirect response.
    pub fn is_mass_action_redirect(&self) -> bool {
        self.mass_action_redirect
    }

    /// Returns `true` when no session state existed for this grid.
    pub fn is_new_session(&self) -> bool {
        self.new_session
    }
}

// =============================================================================
// JSON helpers
// =============================================================================

fn is_control_key(key: &str) -> bool {
    matches!(
        key,
        params::PAGE
            | params::LIMIT
            | params::ORDER
            | params::TEMPLATE
            | params::RESET
            | params::TWEAK
            | params::TWEAKS
            | params::EXPORT
            | params::MASS_ACTION
            | params::MASS_ACTION_ALL_KEYS
            | params::MASS_ACTION_SELECTION
    )
}

fn json_usize(value: &serde_json::Value) -> Option<usize> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().map(|n| n as usize),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => !s.is_empty() && s != "0" && s != "false",
        _ => false,
    }
}

fn json_value_list(value: &serde_json::Value) -> Vec<Value> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        other => serde_json::from_value(other.clone()).ok().into_iter().collect(),
    }
}

fn filter_data_from_json(value: &serde_json::Value) -> Option<FilterData> {
    if value.is_null() {
        return None;
    }
    if value.is_object() {
        return serde_json::from_value(value.clone()).ok();
    }
    serde_json::from_value::<Value>(value.clone())
        .ok()
        .map(FilterData::from_value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::http::Authorizer;
    use crate::http::Router;
    use crate::http::SessionStorage;

    struct StubRouter;

    impl Router for StubRouter {
        fn generate(&self, route: &str, _parameters: &IndexMap<String, String>) -> String {
            format!("/{route}")
        }
    }

    struct StubAuthorizer(bool);

    impl Authorizer for StubAuthorizer {
        fn is_granted(&self, _role: &str) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    struct MemorySession {
        values: Mutex<serde_json::Map<String, serde_json::Value>>,
    }

    impl SessionStorage for MemorySession {
        fn get(&self, key: &str) -> Option<serde_json::Value> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: serde_json::Value) {
            self.values.lock().unwrap().insert(key.to_string(), value);
        }

        fn remove(&self, key: &str) {
            self.values.lock().unwrap().remove(key);
        }
    }

    fn services(granted: bool) -> GridServices {
        GridServices::new(
            Arc::new(StubRouter),
            Arc::new(StubAuthorizer(granted)),
            Arc::new(MemorySession::default()),
        )
    }

    #[test]
    fn test_set_limits_single() {
        let mut grid = Grid::new(services(true), "g");
        grid.set_limits(10u64).unwrap();
        assert_eq!(grid.limits().get(&10), Some(&"10".to_string()));
    }

    #[test]
    fn test_set_limits_list() {
        let mut grid = Grid::new(services(true), "g");
        grid.set_limits(vec![10u64, 50, 100]).unwrap();
        let labels: Vec<_> = grid.limits().values().cloned().collect();
        assert_eq!(labels, ["10", "50", "100"]);
    }

    #[test]
    fn test_set_limits_rejects_zero() {
        let mut grid = Grid::new(services(true), "g");
        assert!(grid.set_limits(vec![10u64, 0]).is_err());
        assert!(grid.set_limits(Vec::<u64>::new()).is_err());
    }

    #[test]
    fn test_set_page_negative() {
        let mut grid = Grid::new(services(true), "g");
        assert!(grid.set_page(-1).is_err());
        grid.set_page(0).unwrap();
        assert_eq!(grid.page(), 0);
    }

    #[test]
    fn test_set_default_page_is_one_based() {
        let mut grid = Grid::new(services(true), "g");
        grid.set_default_page(2);
        assert_eq!(grid.page(), 1);
    }

    #[test]
    fn test_default_order_lowercased() {
        let mut grid = Grid::new(services(true), "g");
        grid.set_default_order("col", "ASC");
        assert_eq!(grid.default_order(), Some("col|asc"));
    }

    #[test]
    fn test_mass_action_role_gating() {
        let mut grid = Grid::new(services(false), "g");
        grid.add_mass_action(MassAction::new("kept"));
        grid.add_mass_action(MassAction::new("dropped").with_role("ROLE_ADMIN"));
        let titles: Vec<_> = grid.mass_actions().iter().map(MassAction::title).collect();
        assert_eq!(titles, ["kept"]);
    }

    #[test]
    fn test_add_tweak_malformed_id() {
        let mut grid = Grid::new(services(true), "g");
        let err = grid
            .add_tweak("t", Tweak::new(), Some("#bad"), None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MalformedTweakId(id)) if id == "#bad"
        ));
    }

    #[test]
    fn test_tweak_url_round_trip() {
        let mut grid = Grid::new(services(true), "g");
        grid.set_route_url("/items");
        grid.add_tweak("Open", Tweak::new().with_page(0), Some("open"), Some("grp"))
            .unwrap();
        let entry = grid.tweak("open").unwrap();
        assert_eq!(entry.title, "Open");
        assert_eq!(entry.group.as_deref(), Some("grp"));
        assert_eq!(entry.url, "/items?[_tweak]=open");
        assert!(grid.tweaks_group("grp").contains_key("open"));
        assert!(grid.tweak("missing").is_err());
    }

    #[test]
    fn test_tweak_url_appends_to_query() {
        let mut grid = Grid::new(services(true), "g");
        grid.set_route_url("/items?tab=2");
        grid.add_tweak("t", Tweak::new(), Some("x"), None).unwrap();
        assert_eq!(grid.tweak("x").unwrap().url, "/items?tab=2&[_tweak]=x");
    }

    #[test]
    fn test_set_template_writes_session() {
        let session = Arc::new(MemorySession::default());
        let services = GridServices::new(
            Arc::new(StubRouter),
            Arc::new(StubAuthorizer(true)),
            session.clone(),
        );
        let mut grid = Grid::new(services, "g");
        grid.set_template(GridTemplate::Named("fancy".to_string()));
        assert_eq!(grid.template().as_deref(), Some("__SELF__fancy"));
        let stored = session.get("grid_g").unwrap();
        assert_eq!(stored["_template"], json!("__SELF__fancy"));
    }

    #[test]
    fn test_set_source_twice() {
        use crate::source::VectorSource;

        let mut grid = Grid::new(services(true), "g");
        grid.set_source(Box::new(VectorSource::new("a", Vec::new())))
            .unwrap();
        let err = grid
            .set_source(Box::new(VectorSource::new("b", Vec::new())))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::SourceAlreadySet)));
    }

    #[test]
    fn test_column_lookup_checks_lazy_buffer() {
        let mut grid = Grid::new(services(true), "g");
        grid.add_column(Column::new("pending", "Pending"));
        assert!(grid.has_column("pending"));
        assert_eq!(grid.column("pending").unwrap().id(), "pending");
        assert!(grid.column("missing").is_err());
    }
}
