//! `lineage` command line.
//!
//! Queries the registry built from every crate linked into this binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lineage_demo as _;
use lineage_registry::{Binding, DescriptorList, Registry, RegistryConfig, split_list};
use tracing::debug;

/// Lineage command line arguments.
#[derive(Parser, Debug)]
#[command(name = "lineage")]
#[command(about = "Discover concrete subtypes registered with the lineage registry")]
struct Args {
	/// TOML file holding the registry configuration
	#[arg(short, long, value_name = "FILE", global = true)]
	config: Option<PathBuf>,

	/// Extra lister descriptors, comma separated
	#[arg(long, value_name = "DESCRIPTORS", global = true)]
	listers: Option<String>,

	/// Lister descriptors to skip, comma separated
	#[arg(long, value_name = "DESCRIPTORS", global = true)]
	exclude: Option<String>,

	/// Environment variable holding lister descriptors
	#[arg(long, value_name = "VAR", global = true)]
	env_listers: Option<String>,

	/// Environment variable holding excluded lister descriptors
	#[arg(long, value_name = "VAR", global = true)]
	env_excluded: Option<String>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// List the concrete subtypes of a supertype
	Classes {
		/// Canonical name of the supertype
		supertype: String,

		/// Succeed even when nothing is found
		#[arg(long)]
		allow_empty: bool,
	},
	/// List catalog units and their public bindings
	Units,
	/// List published entry points
	EntryPoints {
		/// Only show this extension point
		#[arg(long, value_name = "GROUP")]
		group: Option<String>,
	},
	/// Instantiate a type by canonical name
	Construct {
		/// Canonical name of the type
		name: String,
	},
}

fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = load_config(&args)?;
	debug!(?config, "registry configuration");
	let registry = Registry::installed().with_config(config);

	match &args.command {
		Command::Classes { supertype, allow_empty } => {
			let classes = if *allow_empty {
				registry.classes_allow_empty(supertype.as_str())
			} else {
				registry.classes(supertype.as_str())?
			};
			for name in classes.iter() {
				println!("{name}");
			}
		}
		Command::Units => {
			for unit in registry.catalog().units() {
				println!("{}", unit.id());
				for (name, binding) in unit.public_bindings() {
					let kind = match binding {
						Binding::Type(def) if def.is_abstract() => "abstract type",
						Binding::Type(_) => "type",
						Binding::Lister(_) => "lister",
						Binding::Value(_) => "value",
					};
					println!("\t{name} ({kind})");
				}
			}
		}
		Command::EntryPoints { group } => {
			let entries: Vec<_> = match group {
				Some(group) => registry.catalog().entry_points(group).collect(),
				None => registry.catalog().all_entry_points().to_vec(),
			};
			for entry in entries {
				println!("{}\t{}\t{}", entry.group, entry.name, entry.value);
			}
		}
		Command::Construct { name } => match registry.catalog().construct(registry.codec(), name) {
			Ok(_) => println!("{name}: ok"),
			Err(err) if err.is_not_implemented() => {
				println!("{name}: not constructible without arguments");
				return Ok(ExitCode::FAILURE);
			}
			Err(err) => {
				println!("{name}: {err}");
				return Ok(ExitCode::FAILURE);
			}
		},
	}

	Ok(ExitCode::SUCCESS)
}

fn load_config(args: &Args) -> anyhow::Result<RegistryConfig> {
	let mut config = match &args.config {
		Some(path) => RegistryConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => RegistryConfig::default(),
	};

	if let Some(listers) = &args.listers {
		config.class_listers = append(&config.class_listers, listers);
	}
	if let Some(excluded) = &args.exclude {
		config.excluded_class_listers = append(&config.excluded_class_listers, excluded);
	}
	if let Some(var) = &args.env_listers {
		config.env_class_listers = Some(var.clone());
	}
	if let Some(var) = &args.env_excluded {
		config.env_excluded_class_listers = Some(var.clone());
	}

	Ok(config)
}

fn append(list: &DescriptorList, delimited: &str) -> DescriptorList {
	list.iter().cloned().chain(split_list(delimited)).collect::<Vec<_>>().into()
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("lineage=debug,lineage_registry=debug,info")
		} else {
			EnvFilter::new("lineage=info,lineage_registry=info,warn")
		}
	});

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).init();
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;
	use lineage_registry::CLASS_LISTER_GROUP;

	use super::*;

	#[test]
	fn arguments_are_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn flags_extend_the_configured_lists() {
		let args = Args::parse_from(["lineage", "--listers", "a:b, c:d", "--env-listers", "VAR", "classes", "pkg.Base"]);
		let config = load_config(&args).unwrap();
		assert_eq!(config.class_listers.as_slice(), ["a:b", "c:d"]);
		assert_eq!(config.env_class_listers.as_deref(), Some("VAR"));
		assert!(config.excluded_class_listers.is_empty());
	}

	#[test]
	fn demo_formatters_are_linked() {
		let registry = Registry::installed();
		assert!(registry.catalog().entry_points(CLASS_LISTER_GROUP).any(|entry| entry.name == "lineage-demo"));
	}
}
