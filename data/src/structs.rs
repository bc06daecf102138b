use std::collections::BTreeMap;

/// Locale every record is expected to carry; used when the requested one is missing.
pub const DEFAULT_LOCALE: &str = "en";

/// Locales the item data ships names for.
pub const SUPPORTED_LOCALES: &[&str] = &[
	"en", "de", "fr", "es", "pt", "pl", "no", "da", "it", "ru", "ja", "zh-TW", "uk", "zh-CN", "kr", "tr", "hr", "sr",
];

/// Locale → text map with fallback to [`DEFAULT_LOCALE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Localized(pub BTreeMap<String, String>);

impl Localized {
	/// Text for `locale`, else the default locale. Empty strings count as missing.
	pub fn get(&self, locale: &str) -> Option<&str> {
		let pick = |l: &str| self.0.get(l).map(String::as_str).filter(|s| !s.is_empty());
		pick(locale).or_else(|| pick(DEFAULT_LOCALE))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<const N: usize> From<[(&str, &str); N]> for Localized {
	fn from(v: [(&str, &str); N]) -> Self {
		Self(v.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect())
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Rarity {
	Common,
	Uncommon,
	Rare,
	Epic,
	Legendary,
	#[default]
	#[serde(other)]
	Unknown,
}

/// Identifier → count, in identifier order.
pub type Quantities = BTreeMap<String, u32>;

/// One item as authored in the data files. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
	pub id: String,
	pub name: Localized,
	pub description: Localized,
	/// Free-form item category ("Material", "Weapon", ...).
	pub kind: Option<String>,
	pub rarity: Rarity,
	pub value: u32,
	pub weight: f32,
	pub stack_size: u32,
	pub recipe: Option<Quantities>,
	pub craft_bench: Option<String>,
	pub recycles_into: Option<Quantities>,
	pub salvages_into: Option<Quantities>,
}

impl ItemRecord {
	/// A bare record with only an id and an English name.
	pub fn new(id: impl Into<String>, name_en: impl AsRef<str>) -> Self {
		Self {
			id: id.into(),
			name: Localized::from([(DEFAULT_LOCALE, name_en.as_ref())]),
			description: Localized::default(),
			kind: None,
			rarity: Rarity::Unknown,
			value: 0,
			weight: 0.0,
			stack_size: 1,
			recipe: None,
			craft_bench: None,
			recycles_into: None,
			salvages_into: None,
		}
	}

	/// Localized display name, falling back to the id.
	pub fn display_name(&self, locale: &str) -> &str {
		self.name.get(locale).unwrap_or(&self.id)
	}
}

/// An upgradeable hideout bench. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRecord {
	pub id: String,
	pub name: Localized,
	/// Level → required items for that level.
	pub levels: BTreeMap<u32, Quantities>,
}

impl BenchRecord {
	pub fn display_name(&self, locale: &str) -> &str {
		self.name.get(locale).unwrap_or(&self.id)
	}
}
