//! Value generators.

use std::cell::Cell;

use lineage_registry::{ConstructError, Instance, abstract_type, concrete_type};

/// Produces an endless sequence of values.
pub trait Generator {
	fn next_value(&self) -> String;
}

abstract_type!(pub GENERATOR, {
	unit: "lineage_demo",
	name: "Generator",
});

fn boxed<T: Generator + Default + 'static>() -> Result<Instance, ConstructError> {
	Ok(Box::new(Box::new(T::default()) as Box<dyn Generator>))
}

#[derive(Default)]
pub struct CountingGenerator {
	next: Cell<u64>,
}

impl Generator for CountingGenerator {
	fn next_value(&self) -> String {
		let value = self.next.get();
		self.next.set(value + 1);
		value.to_string()
	}
}

concrete_type!(COUNTING, {
	unit: "lineage_demo.generators",
	name: "CountingGenerator",
	extends: ["lineage_demo.Generator"],
	factory: boxed::<CountingGenerator>,
});

pub struct RepeatingGenerator {
	pub value: String,
}

impl Default for RepeatingGenerator {
	fn default() -> Self {
		Self { value: "-".to_owned() }
	}
}

impl Generator for RepeatingGenerator {
	fn next_value(&self) -> String {
		self.value.clone()
	}
}

concrete_type!(REPEATING, {
	unit: "lineage_demo.generators",
	name: "RepeatingGenerator",
	extends: ["lineage_demo.Generator"],
	factory: boxed::<RepeatingGenerator>,
});

/// Reads its seed from `LINEAGE_DEMO_SEED`.
pub struct SeededGenerator {
	state: Cell<u64>,
}

impl SeededGenerator {
	pub fn new(seed: u64) -> Self {
		Self { state: Cell::new(seed) }
	}
}

impl Generator for SeededGenerator {
	fn next_value(&self) -> String {
		// xorshift64
		let mut x = self.state.get().max(1);
		x ^= x << 13;
		x ^= x >> 7;
		x ^= x << 17;
		self.state.set(x);
		format!("{x:016x}")
	}
}

fn seeded() -> Result<Instance, ConstructError> {
	let seed = std::env::var("LINEAGE_DEMO_SEED").map_err(ConstructError::failed)?;
	let seed: u64 = seed.trim().parse().map_err(ConstructError::failed)?;
	Ok(Box::new(Box::new(SeededGenerator::new(seed)) as Box<dyn Generator>))
}

concrete_type!(SEEDED, {
	unit: "lineage_demo.generators",
	name: "SeededGenerator",
	extends: ["lineage_demo.Generator"],
	factory: seeded,
});

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn counting_starts_at_zero() {
		let generator = CountingGenerator::default();
		let values: Vec<_> = (0..3).map(|_| generator.next_value()).collect();
		assert_eq!(values, ["0", "1", "2"]);
	}

	#[test]
	fn seeded_is_deterministic() {
		let a = SeededGenerator::new(7);
		let b = SeededGenerator::new(7);
		assert_eq!(a.next_value(), b.next_value());
		assert_ne!(a.next_value(), SeededGenerator::new(8).next_value());
	}
}
