//! Plugin catalog and supplier selection.
//!
//! Plugins ([`Extension`]s) contribute suppliers and value-type aliases.
//! Discovery happens once; the resulting [`PluginCatalog`] is immutable and
//! may be shared by any number of registries.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::config::FrameworkConfig;
use crate::error::{FixtureError, Result};
use crate::supplier::Supplier;
use crate::types::ValueType;

static INSTALLED: OnceLock<Arc<PluginCatalog>> = OnceLock::new();

/// A plugin contributing fixture suppliers.
pub trait Extension: Send + Sync {
    /// Returns the suppliers provided by this plugin, in preference order.
    fn suppliers(&self) -> Vec<Arc<dyn Supplier>>;

    /// Returns short configuration names for value types.
    fn value_type_aliases(&self) -> Vec<(ValueType, String)> {
        Vec::new()
    }
}

/// Short configuration names for value types (e.g. `Server` → `"server"`).
#[derive(Debug, Clone, Default)]
pub struct ValueTypeAliases {
    aliases: HashMap<ValueType, String>,
}

impl ValueTypeAliases {
    /// Creates an empty alias table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an alias. The first alias registered for a type wins.
    pub fn add(&mut self, value_type: ValueType, alias: impl Into<String>) {
        self.aliases.entry(value_type).or_insert_with(|| alias.into());
    }

    /// Adds every alias in `aliases`.
    pub fn add_all(&mut self, aliases: impl IntoIterator<Item = (ValueType, String)>) {
        for (value_type, alias) in aliases {
            self.add(value_type, alias);
        }
    }

    /// Returns the registered alias for a type.
    #[must_use]
    pub fn alias(&self, value_type: ValueType) -> Option<&str> {
        self.aliases.get(&value_type).map(String::as_str)
    }

    /// Returns the alias for a type, falling back to its short type name.
    #[must_use]
    pub fn alias_or_name(&self, value_type: ValueType) -> String {
        self.alias(value_type)
            .map_or_else(|| value_type.short_name().to_string(), str::to_string)
    }
}

/// Immutable result of plugin discovery.
#[derive(Clone, Default)]
pub struct PluginCatalog {
    suppliers: Vec<Arc<dyn Supplier>>,
    aliases: ValueTypeAliases,
}

impl PluginCatalog {
    /// Creates a catalog from explicit suppliers and aliases.
    #[must_use]
    pub fn new(suppliers: Vec<Arc<dyn Supplier>>, aliases: ValueTypeAliases) -> Self {
        Self { suppliers, aliases }
    }

    /// Collects suppliers and aliases from every extension, in order.
    #[must_use]
    pub fn discover<'a>(extensions: impl IntoIterator<Item = &'a dyn Extension>) -> Self {
        let mut catalog = Self::default();
        for extension in extensions {
            catalog.suppliers.extend(extension.suppliers());
            catalog.aliases.add_all(extension.value_type_aliases());
        }
        tracing::debug!(
            suppliers = catalog.suppliers.len(),
            "plugin discovery complete"
        );
        catalog
    }

    /// Installs the process-wide catalog.
    ///
    /// # Errors
    /// Returns an error if a catalog is already installed.
    pub fn install(catalog: Self) -> Result<Arc<Self>> {
        let catalog = Arc::new(catalog);
        INSTALLED
            .set(Arc::clone(&catalog))
            .map_err(|_| FixtureError::config("plugin catalog already installed"))?;
        Ok(catalog)
    }

    /// Returns the process-wide catalog, if one was installed.
    #[must_use]
    pub fn installed() -> Option<Arc<Self>> {
        INSTALLED.get().cloned()
    }

    /// Returns every discovered supplier, in discovery order.
    #[must_use]
    pub fn suppliers(&self) -> &[Arc<dyn Supplier>] {
        &self.suppliers
    }

    /// Returns the value-type alias table.
    #[must_use]
    pub const fn aliases(&self) -> &ValueTypeAliases {
        &self.aliases
    }

    /// Returns the suppliers of `value_type`, in discovery order.
    pub fn suppliers_for(&self, value_type: ValueType) -> impl Iterator<Item = &Arc<dyn Supplier>> {
        self.suppliers
            .iter()
            .filter(move |s| s.value_type() == value_type)
    }

    /// Returns the supplier of `value_type` registered under `alias`.
    #[must_use]
    pub fn supplier(&self, value_type: ValueType, alias: &str) -> Option<&Arc<dyn Supplier>> {
        self.suppliers_for(value_type).find(|s| s.alias() == alias)
    }

    /// Chooses the active supplier for every value type.
    ///
    /// When `config` selects an alias for a type, only the supplier with
    /// that alias is kept; otherwise the first supplier discovered wins.
    /// Everything else is recorded as skipped.
    #[must_use]
    pub fn select(&self, config: &FrameworkConfig) -> SupplierSelection {
        let mut selection = SupplierSelection::default();
        let mut loaded: Vec<ValueType> = Vec::new();

        for supplier in &self.suppliers {
            let value_type = supplier.value_type();
            let should_add = !loaded.contains(&value_type)
                && config
                    .selected_supplier(value_type, &self.aliases)
                    .is_none_or(|requested| requested == supplier.alias());

            if should_add {
                loaded.push(value_type);
                selection.active.push(Arc::clone(supplier));
            } else {
                selection.skipped.push(Arc::clone(supplier));
            }
        }

        for value_type in self.suppliers.iter().map(|s| s.value_type()) {
            if loaded.contains(&value_type) {
                continue;
            }
            if let Some(requested) = config.selected_supplier(value_type, &self.aliases) {
                tracing::warn!(
                    value_type = %self.aliases.alias_or_name(value_type),
                    alias = requested,
                    "configured supplier alias matches no discovered supplier"
                );
                loaded.push(value_type);
            }
        }

        selection.log(&self.aliases);
        selection
    }
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCatalog")
            .field(
                "suppliers",
                &self.suppliers.iter().map(|s| s.alias()).collect::<Vec<_>>(),
            )
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Outcome of [`PluginCatalog::select`].
#[derive(Clone, Default)]
pub struct SupplierSelection {
    /// Suppliers in use, at most one per value type.
    pub active: Vec<Arc<dyn Supplier>>,
    /// Suppliers passed over, kept for diagnostics.
    pub skipped: Vec<Arc<dyn Supplier>>,
}

impl SupplierSelection {
    fn log(&self, aliases: &ValueTypeAliases) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        let describe = |suppliers: &[Arc<dyn Supplier>]| {
            suppliers
                .iter()
                .map(|s| format!("{} --> {}", aliases.alias_or_name(s.value_type()), s.alias()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        tracing::debug!(loaded = %describe(&self.active), "loaded suppliers");
        tracing::debug!(skipped = %describe(&self.skipped), "skipped suppliers");
    }
}
