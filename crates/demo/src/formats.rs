//! Row formatters.

use lineage_registry::{ConstructError, Instance, abstract_type, concrete_type, not_implemented, reexport};

/// Renders a row of fields as a single line.
pub trait Formatter {
	fn format(&self, fields: &[&str]) -> String;
}

abstract_type!(pub FORMATTER, {
	unit: "lineage_demo._api",
	name: "Formatter",
});
reexport!(FORMATTER => "lineage_demo");

fn boxed<T: Formatter + Default + 'static>() -> Result<Instance, ConstructError> {
	Ok(Box::new(Box::new(T::default()) as Box<dyn Formatter>))
}

#[derive(Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
	fn format(&self, fields: &[&str]) -> String {
		fields.join(" ")
	}
}

concrete_type!(PLAIN, {
	unit: "lineage_demo.formats",
	name: "PlainFormatter",
	extends: ["lineage_demo.Formatter"],
	factory: boxed::<PlainFormatter>,
});

#[derive(Default)]
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
	fn format(&self, fields: &[&str]) -> String {
		fields
			.iter()
			.map(|field| {
				if field.contains([',', '"', '\n']) {
					format!("\"{}\"", field.replace('"', "\"\""))
				} else {
					(*field).to_owned()
				}
			})
			.collect::<Vec<_>>()
			.join(",")
	}
}

concrete_type!(CSV, {
	unit: "lineage_demo.formats",
	name: "CsvFormatter",
	extends: ["lineage_demo.Formatter"],
	factory: boxed::<CsvFormatter>,
});

#[derive(Default)]
pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
	fn format(&self, fields: &[&str]) -> String {
		let mut line = String::from("|");
		for field in fields {
			line.push(' ');
			line.push_str(&field.replace('|', "\\|"));
			line.push_str(" |");
		}
		line
	}
}

concrete_type!(MARKDOWN, {
	unit: "lineage_demo.formats._markdown",
	name: "MarkdownFormatter",
	extends: ["lineage_demo.Formatter"],
	factory: boxed::<MarkdownFormatter>,
});
reexport!(MARKDOWN => "lineage_demo.formats");

/// Needs a template string, so it cannot be discovered.
pub struct TemplateFormatter {
	pub template: String,
}

impl Formatter for TemplateFormatter {
	fn format(&self, fields: &[&str]) -> String {
		fields.iter().enumerate().fold(self.template.clone(), |out, (i, field)| out.replace(&format!("{{{i}}}"), field))
	}
}

concrete_type!(TEMPLATE, {
	unit: "lineage_demo.formats",
	name: "TemplateFormatter",
	extends: ["lineage_demo.Formatter"],
	factory: not_implemented,
});
