//! The subtype registry and its per-supertype cache.
//!
//! # Cache lifecycle
//!
//! A supertype key is populated on its first lookup and stays populated until
//! any configuration property changes, at which point every key is dropped at
//! once. Concurrent misses on the same key share a single scan.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::{DescriptorList, RegistryConfig};
use crate::error::RegistryError;
use crate::lister::{ExclusionSet, ListerResolver};
use crate::name::{DottedNames, NameCodec, SupertypeKey, TypeQuery};
use crate::reentry::InProgress;
use crate::sources::{CLASS_LISTER_GROUP, ConfiguredSource, DiscoverySource, EntryPointSource, Env, EnvSource, ProcessEnv, split_list};


/// Sorted, deduplicated canonical names of discovered subtypes.
pub type Classes = Arc<[String]>;

type Slot = Arc<OnceLock<Classes>>;

struct State {
	config: Arc<RegistryConfig>,
	cache: FxHashMap<SupertypeKey, Slot>,
}

/// Discovers and caches the concrete subtypes of supertypes.
pub struct Registry {
	catalog: Arc<Catalog>,
	codec: Arc<dyn NameCodec>,
	env: Arc<dyn Env>,
	state: Mutex<State>,
}

impl Registry {
	/// Creates a registry over `catalog` with the default codec, the process
	/// environment and an empty configuration.
	pub fn new(catalog: Arc<Catalog>) -> Self {
		Self {
			catalog,
			codec: Arc::new(DottedNames),
			env: Arc::new(ProcessEnv),
			state: Mutex::new(State {
				config: Arc::default(),
				cache: FxHashMap::default(),
			}),
		}
	}

	/// Creates a registry over everything linked into the process.
	pub fn installed() -> Self {
		Self::new(Arc::new(Catalog::installed()))
	}

	pub fn with_config(mut self, config: RegistryConfig) -> Self {
		let state = self.state.get_mut();
		state.config = Arc::new(config);
		state.cache.clear();
		self
	}

	pub fn with_codec(mut self, codec: Arc<dyn NameCodec>) -> Self {
		self.codec = codec;
		self.state.get_mut().cache.clear();
		self
	}

	pub fn with_env(mut self, env: Arc<dyn Env>) -> Self {
		self.env = env;
		self.state.get_mut().cache.clear();
		self
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn codec(&self) -> &dyn NameCodec {
		&*self.codec
	}

	/// Returns the subtypes of `supertype`, failing if there are none.
	pub fn classes<'q>(&self, supertype: impl Into<TypeQuery<'q>>) -> Result<Classes, RegistryError> {
		let key = self.key_for(supertype.into());
		let classes = self.lookup(&key);
		if classes.is_empty() {
			return Err(RegistryError::NoClasses { supertype: key });
		}
		Ok(classes)
	}

	/// Returns the subtypes of `supertype`, possibly none.
	pub fn classes_allow_empty<'q>(&self, supertype: impl Into<TypeQuery<'q>>) -> Classes {
		let key = self.key_for(supertype.into());
		self.lookup(&key)
	}

	/// Normalizes a query to its cache key.
	///
	/// Names of known types are re-encoded so that a private path and its
	/// public re-export share one key.
	pub fn key_for(&self, query: TypeQuery<'_>) -> SupertypeKey {
		let def = match query {
			TypeQuery::Type(def) => def,
			TypeQuery::Name(name) => match self.catalog.find_type(&*self.codec, name) {
				Some(def) => def,
				None => return SupertypeKey::from(name),
			},
		};
		SupertypeKey::from(self.codec.encode(&self.catalog, def))
	}

	/// Keys whose discovery has completed, in sorted order.
	pub fn cached_supertypes(&self) -> Vec<SupertypeKey> {
		let state = self.state.lock();
		let mut keys: Vec<_> = state.cache.iter().filter(|(_, slot)| slot.get().is_some()).map(|(key, _)| key.clone()).collect();
		keys.sort();
		keys
	}

	/// Drops every cached key.
	pub fn invalidate(&self) {
		self.state.lock().cache.clear();
	}

	pub fn config(&self) -> Arc<RegistryConfig> {
		self.state.lock().config.clone()
	}

	/// Replaces the whole configuration and drops every cached key.
	pub fn apply_config(&self, config: RegistryConfig) {
		self.update_config(|current| *current = config);
	}

	pub fn class_listers(&self) -> DescriptorList {
		self.config().class_listers.clone()
	}

	pub fn set_class_listers(&self, listers: impl Into<DescriptorList>) {
		let listers = listers.into();
		self.update_config(|config| config.class_listers = listers);
	}

	pub fn env_class_listers(&self) -> Option<String> {
		self.config().env_class_listers.clone()
	}

	pub fn set_env_class_listers(&self, var: Option<&str>) {
		self.update_config(|config| config.env_class_listers = var.map(str::to_owned));
	}

	pub fn excluded_class_listers(&self) -> DescriptorList {
		self.config().excluded_class_listers.clone()
	}

	pub fn set_excluded_class_listers(&self, excluded: impl Into<DescriptorList>) {
		let excluded = excluded.into();
		self.update_config(|config| config.excluded_class_listers = excluded);
	}

	pub fn env_excluded_class_listers(&self) -> Option<String> {
		self.config().env_excluded_class_listers.clone()
	}

	pub fn set_env_excluded_class_listers(&self, var: Option<&str>) {
		self.update_config(|config| config.env_excluded_class_listers = var.map(str::to_owned));
	}

	fn update_config(&self, update: impl FnOnce(&mut RegistryConfig)) {
		let mut state = self.state.lock();
		update(Arc::make_mut(&mut state.config));
		state.cache.clear();
	}

	fn lookup(&self, key: &SupertypeKey) -> Classes {
		let Some(_in_progress) = InProgress::enter(std::ptr::from_ref(self).addr(), key.as_str()) else {
			warn!(supertype = %key, "refusing re-entrant lookup while its classes are being discovered");
			return Vec::new().into();
		};
		// Slot and config are taken together so a scan always matches the
		// configuration its slot was created under.
		let (slot, config) = {
			let mut state = self.state.lock();
			let slot = state.cache.entry(key.clone()).or_default().clone();
			(slot, state.config.clone())
		};
		slot.get_or_init(|| self.populate(key, &config)).clone()
	}

	fn populate(&self, key: &SupertypeKey, config: &RegistryConfig) -> Classes {
		let exclusions = self.exclusions(config);
		let resolver = ListerResolver::new(&self.catalog, &*self.codec).with_exclusions(&exclusions);

		let entry_points = EntryPointSource::new(&self.catalog, CLASS_LISTER_GROUP);
		let configured = ConfiguredSource::new(config.class_listers.as_slice());
		let env = config.env_class_listers.as_deref().map(|var| EnvSource::new(&*self.env, var));

		let mut sources: Vec<&dyn DiscoverySource> = vec![&entry_points, &configured];
		if let Some(env) = &env {
			sources.push(env);
		}

		let mut all = BTreeSet::new();
		for source in sources {
			let descriptors = source.descriptors();
			if descriptors.is_empty() {
				continue;
			}
			let found = resolver.resolve(key.as_str(), descriptors.as_slice());
			debug!(supertype = %key, source = source.label(), descriptors = descriptors.len(), found = found.len(), "resolved source");
			all.extend(found);
		}

		debug!(supertype = %key, classes = all.len(), "populated class cache");
		all.into_iter().collect()
	}

	fn exclusions(&self, config: &RegistryConfig) -> ExclusionSet {
		let mut exclusions: ExclusionSet = config.excluded_class_listers.iter().cloned().collect();
		if let Some(var) = &config.env_excluded_class_listers
			&& let Some(value) = self.env.var(var)
		{
			exclusions.extend(split_list(&value));
		}
		exclusions
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("Registry")
			.field("config", &state.config)
			.field("cached", &state.cache.len())
			.finish_non_exhaustive()
	}
}
