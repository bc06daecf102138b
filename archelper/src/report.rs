//! Plain-text rendering of lookups and recognition results.

use std::fmt::Write;

use data::{DescribedItem, ItemRef, Lookup};
use ie::Candidate;

use crate::recognizer::Recognition;

fn name(lookup: &Lookup<String>) -> String {
	match lookup {
		Lookup::Found(name) => name.clone(),
		Lookup::NotFound { identifier } => format!("{identifier} (unknown)"),
	}
}

fn refs(out: &mut String, title: &str, refs: &[ItemRef]) {
	if refs.is_empty() {
		return;
	}
	let _ = writeln!(out, "{title}:");
	for r in refs {
		let _ = writeln!(out, "  {} x{}", name(&r.name), r.count);
	}
}

pub fn item(item: &DescribedItem) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{} [{}]", item.name, item.id);
	let _ = writeln!(
		out,
		"  {:?}{}  value {}  weight {}  stack {}",
		item.rarity,
		item.kind.as_deref().map(|k| format!(" {k}")).unwrap_or_default(),
		item.value,
		item.weight,
		item.stack_size
	);
	if let Some(desc) = &item.description {
		let _ = writeln!(out, "  {desc}");
	}
	if item.tiers.len() > 1 {
		let tiers = item.tiers.iter().map(u32::to_string).collect::<Vec<_>>().join(", ");
		let _ = writeln!(out, "  tiers: {tiers}");
	}
	if item.required_for_project == Some(true) {
		let _ = writeln!(out, "  needed for a project");
	}

	refs(&mut out, "Recipe", &item.recipe);
	if let Some(bench) = &item.craft_bench {
		let _ = writeln!(out, "Crafted at: {}", name(&bench.name));
	}
	refs(&mut out, "Recycles into", &item.recycles_into);
	refs(&mut out, "Salvages into", &item.salvages_into);
	refs(&mut out, "Used in", &item.used_in);

	if !item.bench_usage.is_empty() {
		let _ = writeln!(out, "Hideout:");
		for u in &item.bench_usage {
			let _ = writeln!(out, "  {} level {} x{}", name(&u.bench.name), u.level, u.count);
		}
	}
	out
}

pub fn not_found(identifier: &str, hint: Option<&str>) -> String {
	match hint {
		Some(hint) => format!("no item data for '{identifier}' (did you mean '{hint}'?)"),
		None => format!("no item data for '{identifier}'"),
	}
}

fn candidate(c: &Candidate) -> String {
	let parts = c
		.breakdown
		.iter()
		.map(|(method, score)| match score {
			Some(s) => format!("{method} {s:.3}"),
			None => format!("{method} -"),
		})
		.collect::<Vec<_>>()
		.join(", ");
	format!("{} {:.3} ({parts})", c.id, c.score)
}

pub fn recognition(r: &Recognition) -> String {
	match r {
		Recognition::Accepted { candidate: c, item: found } => {
			let mut out = format!("matched {}\n", candidate(c));
			match found {
				Lookup::Found(described) => out.push_str(&item(described)),
				Lookup::NotFound { identifier } => {
					let _ = writeln!(out, "{}", not_found(identifier, None));
				}
			}
			out
		}
		Recognition::Rejected { best } => {
			let mut out = String::from("no confident match\n");
			for c in best {
				let _ = writeln!(out, "  {}", candidate(c));
			}
			out
		}
		Recognition::Cancelled { scanned, total } => format!("cancelled after {scanned}/{total} icons\n"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn described() -> DescribedItem {
		DescribedItem {
			id: "medkit".into(),
			locale: "en".into(),
			name: "Medkit".into(),
			description: None,
			kind: Some("Quick Use".into()),
			rarity: data::Rarity::Rare,
			value: 640,
			weight: 0.5,
			stack_size: 3,
			recipe: vec![
				ItemRef {
					id: "fabric".into(),
					name: Lookup::Found("Fabric".into()),
					count: 3,
				},
				ItemRef {
					id: "ghost_herb".into(),
					name: Lookup::NotFound {
						identifier: "ghost_herb".into(),
					},
					count: 1,
				},
			],
			craft_bench: None,
			recycles_into: vec![],
			salvages_into: vec![],
			used_in: vec![],
			bench_usage: vec![],
			tiers: vec![],
			required_for_project: Some(true),
		}
	}

	#[test]
	fn item_lists_recipe_and_marks_unknown_references() {
		let text = item(&described());
		assert!(text.starts_with("Medkit [medkit]\n"));
		assert!(text.contains("Rare Quick Use  value 640"));
		assert!(text.contains("  Fabric x3\n"));
		assert!(text.contains("  ghost_herb (unknown) x1\n"));
		assert!(text.contains("needed for a project"));
		assert!(!text.contains("Used in"));
	}

	#[test]
	fn rejection_lists_breakdown() {
		let text = recognition(&Recognition::Rejected {
			best: vec![Candidate {
				id: "rope".into(),
				score: 0.25,
				breakdown: vec![("correlation", Some(0.5)), ("features", None)],
			}],
		});
		assert_eq!(text, "no confident match\n  rope 0.250 (correlation 0.500, features -)\n");
	}

	#[test]
	fn not_found_offers_hint() {
		assert_eq!(
			not_found("metal_part", Some("metal_parts")),
			"no item data for 'metal_part' (did you mean 'metal_parts'?)"
		);
	}
}
