//! Registry configuration.
//!
//! Configuration can be built in code or read from TOML, either at the top
//! level or under a `[registry]` table:
//!
//! ```toml
//! [registry]
//! class_listers = "pkg.listers:list_handlers, pkg.listers:list_generators"
//! env_class_listers = "MYAPP_LISTERS"
//! excluded_class_listers = ["pkg.listers:list_legacy"]
//! env_excluded_class_listers = "MYAPP_EXCLUDED_LISTERS"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sources::split_list;

/// A list of descriptors.
///
/// Converts from a comma-delimited string (split and trimmed), from an
/// explicit list (kept verbatim) or from `None` (empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ListInput", into = "Vec<String>")]
pub struct DescriptorList(Vec<String>);

impl DescriptorList {
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, String> {
		self.0.iter()
	}
}

impl From<&str> for DescriptorList {
	fn from(value: &str) -> Self {
		Self(split_list(value))
	}
}

impl From<String> for DescriptorList {
	fn from(value: String) -> Self {
		Self::from(value.as_str())
	}
}

impl From<Vec<String>> for DescriptorList {
	fn from(items: Vec<String>) -> Self {
		Self(items)
	}
}

impl From<&[&str]> for DescriptorList {
	fn from(items: &[&str]) -> Self {
		Self(items.iter().map(|item| (*item).to_owned()).collect())
	}
}

impl<const N: usize> From<[&str; N]> for DescriptorList {
	fn from(items: [&str; N]) -> Self {
		Self::from(&items[..])
	}
}

impl<T: Into<DescriptorList>> From<Option<T>> for DescriptorList {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or_default()
	}
}

impl From<DescriptorList> for Vec<String> {
	fn from(list: DescriptorList) -> Self {
		list.0
	}
}

impl<'a> IntoIterator for &'a DescriptorList {
	type Item = &'a String;
	type IntoIter = std::slice::Iter<'a, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListInput {
	Delimited(String),
	Items(Vec<String>),
}

impl From<ListInput> for DescriptorList {
	fn from(input: ListInput) -> Self {
		match input {
			ListInput::Delimited(value) => Self::from(value),
			ListInput::Items(items) => Self::from(items),
		}
	}
}

/// Everything a [`Registry`](crate::Registry) can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
	/// Lister descriptors consulted in addition to entry points.
	pub class_listers: DescriptorList,
	/// Name of the environment variable holding lister descriptors.
	pub env_class_listers: Option<String>,
	/// Descriptors never resolved.
	pub excluded_class_listers: DescriptorList,
	/// Name of the environment variable holding excluded descriptors.
	pub env_excluded_class_listers: Option<String>,
}

#[derive(Deserialize)]
struct ConfigFile {
	registry: Option<RegistryConfig>,
}

impl RegistryConfig {
	/// Parses TOML, preferring a `[registry]` table when present.
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		let file: ConfigFile = toml::from_str(content)?;
		match file.registry {
			Some(config) => Ok(config),
			None => Ok(toml::from_str(content)?),
		}
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}
}
