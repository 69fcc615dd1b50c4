//! Runtime type registry: the extensibility seam for new record kinds
//!
//! A contract knows how to rebuild a typed record from its stored payload.
//! New asset types register at runtime under an open string key; nothing in
//! the registry dispatches over a closed type list.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use crate::asset::{Asset, AssetMetadata};
use crate::error::{RegistryError, Result};
use crate::ids::AssetId;

/// Validation and import capability registered per asset type
pub trait AssetContract: Send + Sync + std::fmt::Debug {
    /// Rebuild a typed record from its stored envelope and payload
    fn import(
        &self,
        id: AssetId,
        metadata: AssetMetadata,
        payload: &serde_json::Value,
    ) -> Result<Box<dyn Asset>>;
}

/// Serde-backed contract for any asset type whose payload deserializes
/// straight into the record struct.
pub struct PayloadContract<A> {
    _marker: PhantomData<fn() -> A>,
}

impl<A> PayloadContract<A> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A> Default for PayloadContract<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for PayloadContract<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadContract").finish()
    }
}

impl<A> AssetContract for PayloadContract<A>
where
    A: Asset + DeserializeOwned + 'static,
{
    fn import(
        &self,
        id: AssetId,
        metadata: AssetMetadata,
        payload: &serde_json::Value,
    ) -> Result<Box<dyn Asset>> {
        let mut asset: A = serde_json::from_value(payload.clone())?;
        asset.restore(id, metadata);
        Ok(Box::new(asset))
    }
}

/// Maps a type name to its registered contract.
///
/// Cheap to clone; all clones share one underlying table.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<dyn AssetContract>>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract under `name`.
    ///
    /// Fails with `TypeAlreadyRegistered` if the name is taken and
    /// `overwrite` is false; with `overwrite` the old contract is replaced.
    /// Records already loaded through the old contract are unaffected until
    /// their next load.
    pub fn register(
        &self,
        name: &str,
        contract: Arc<dyn AssetContract>,
        overwrite: bool,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.contains_key(name) && !overwrite {
            return Err(RegistryError::TypeAlreadyRegistered(name.to_string()));
        }
        inner.insert(name.to_string(), contract);
        Ok(())
    }

    /// Look up the contract registered under `name`
    pub fn get(&self, name: &str) -> Result<Arc<dyn AssetContract>> {
        let inner = self.inner.read().unwrap();
        inner
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::TypeNotRegistered(name.to_string()))
    }

    /// Check whether a contract is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().unwrap().contains_key(name)
    }

    /// Names of all registered types, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Widget {
        #[serde(skip)]
        id: AssetId,
        #[serde(skip)]
        metadata: AssetMetadata,
        label: String,
    }

    impl Asset for Widget {
        fn id(&self) -> &AssetId {
            &self.id
        }

        fn asset_type(&self) -> &'static str {
            "widget"
        }

        fn metadata(&self) -> &AssetMetadata {
            &self.metadata
        }

        fn metadata_mut(&mut self) -> &mut AssetMetadata {
            &mut self.metadata
        }

        fn validate(&self) -> Result<()> {
            Ok(())
        }

        fn export(&self) -> Result<serde_json::Value> {
            Ok(serde_json::to_value(self)?)
        }

        fn restore(&mut self, id: AssetId, metadata: AssetMetadata) {
            self.id = id;
            self.metadata = metadata;
        }
    }

    #[test]
    fn test_duplicate_registration_fails_without_overwrite() {
        let registry = TypeRegistry::new();
        let contract_a: Arc<dyn AssetContract> = Arc::new(PayloadContract::<Widget>::new());
        let contract_b: Arc<dyn AssetContract> = Arc::new(PayloadContract::<Widget>::new());

        registry.register("widget", contract_a, false).unwrap();
        let err = registry.register("widget", contract_b, false).unwrap_err();
        assert!(matches!(err, RegistryError::TypeAlreadyRegistered(name) if name == "widget"));
    }

    #[test]
    fn test_overwrite_replaces_contract() {
        let registry = TypeRegistry::new();
        let contract_a: Arc<dyn AssetContract> = Arc::new(PayloadContract::<Widget>::new());
        let contract_b: Arc<dyn AssetContract> = Arc::new(PayloadContract::<Widget>::new());

        registry.register("widget", contract_a, false).unwrap();
        registry.register("widget", contract_b.clone(), true).unwrap();

        let resolved = registry.get("widget").unwrap();
        assert!(Arc::ptr_eq(&resolved, &contract_b));
    }

    #[test]
    fn test_get_unregistered_fails() {
        let registry = TypeRegistry::new();
        let err = registry.get("ghost").unwrap_err();
        assert!(matches!(err, RegistryError::TypeNotRegistered(name) if name == "ghost"));
    }

    #[test]
    fn test_payload_contract_round_trip() {
        let widget = Widget {
            id: AssetId::new(),
            metadata: AssetMetadata::new(),
            label: "dial".to_string(),
        };
        let payload = widget.export().unwrap();

        let contract = PayloadContract::<Widget>::new();
        let restored = contract
            .import(widget.id.clone(), widget.metadata.clone(), &payload)
            .unwrap();

        assert_eq!(restored.id(), &widget.id);
        assert_eq!(restored.metadata(), &widget.metadata);
        assert_eq!(restored.export().unwrap(), payload);
    }
}
