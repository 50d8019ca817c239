//! Independent providers of lister descriptors.
//!
//! Each source is queried on its own and its descriptors are resolved on
//! their own; a failing source cannot suppress another source's results.

use std::ffi::OsString;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::catalog::Catalog;

/// Extension point under which packages publish class listers.
pub const CLASS_LISTER_GROUP: &str = "class_lister";

/// Read access to environment variables.
pub trait Env: Send + Sync {
	fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
	fn var(&self, key: &str) -> Option<String> {
		std::env::var_os(key).and_then(|value| utf8_var(key, value))
	}
}

fn utf8_var(key: &str, value: OsString) -> Option<String> {
	match value.into_string() {
		Ok(value) => Some(value),
		Err(value) => {
			warn!(var = key, value = %value.to_string_lossy(), "ignoring environment variable that is not valid UTF-8");
			None
		}
	}
}

impl Env for FxHashMap<String, String> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}

/// Splits a comma-delimited list, trimming items and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
	value.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_owned).collect()
}

/// A provider of `unit:function` descriptors.
pub trait DiscoverySource {
	/// Short label used in diagnostics.
	fn label(&self) -> &'static str;

	fn descriptors(&self) -> Vec<String>;
}

/// Descriptors published as catalog entry points.
pub struct EntryPointSource<'a> {
	catalog: &'a Catalog,
	group: &'a str,
}

impl<'a> EntryPointSource<'a> {
	pub fn new(catalog: &'a Catalog, group: &'a str) -> Self {
		Self { catalog, group }
	}
}

impl DiscoverySource for EntryPointSource<'_> {
	fn label(&self) -> &'static str {
		"entry-points"
	}

	fn descriptors(&self) -> Vec<String> {
		self.catalog.entry_points(self.group).map(|entry| entry.value.to_owned()).collect()
	}
}

/// Descriptors held in a configured environment variable.
pub struct EnvSource<'a> {
	env: &'a dyn Env,
	var: &'a str,
}

impl<'a> EnvSource<'a> {
	pub fn new(env: &'a dyn Env, var: &'a str) -> Self {
		Self { env, var }
	}
}

impl DiscoverySource for EnvSource<'_> {
	fn label(&self) -> &'static str {
		"environment"
	}

	fn descriptors(&self) -> Vec<String> {
		self.env.var(self.var).map(|value| split_list(&value)).unwrap_or_default()
	}
}

/// Descriptors configured directly on the registry.
pub struct ConfiguredSource<'a> {
	listers: &'a [String],
}

impl<'a> ConfiguredSource<'a> {
	pub fn new(listers: &'a [String]) -> Self {
		Self { listers }
	}
}

impl DiscoverySource for ConfiguredSource<'_> {
	fn label(&self) -> &'static str {
		"configured"
	}

	fn descriptors(&self) -> Vec<String> {
		self.listers.to_vec()
	}
}
