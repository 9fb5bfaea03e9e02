use std::sync::LazyLock;

use regex::Regex;

static MARKET_PATTERN: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?i)^market\s+(?:group\s+)?for\s+(.+)$").ok());
static PRODUCTION_PATTERN: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?i)^(.+?)\s+production(?:\s*,.*)?$").ok());

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImpactFactorVariant {
	/// Aggregate market mix, e.g. "market for tomato, fresh grade".
	Market { product: String },
	/// Single-producer process, e.g. "tomato production, fresh grade, open field".
	Production { product: String },
	Other,
}
impl ImpactFactorVariant {
	pub fn product(&self) -> Option<&str> {
		match self {
			Self::Market { product } | Self::Production { product } => Some(product.as_str()),
			Self::Other => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketPreferenceViolation {
	/// Position of the "market for X" entry in the scored slice.
	pub market: usize,
	/// Position of the "X production" entry in the scored slice.
	pub production: usize,
}

pub fn classify(impact_factor_name: &str) -> ImpactFactorVariant {
	let name = impact_factor_name.trim();

	if let Some(product) = capture_product(&MARKET_PATTERN, name) {
		return ImpactFactorVariant::Market { product };
	}
	if let Some(product) = capture_product(&PRODUCTION_PATTERN, name) {
		return ImpactFactorVariant::Production { product };
	}

	ImpactFactorVariant::Other
}

/// Finds pairs where "market for X" scored strictly below "X production" for the same X.
pub fn market_preference_violations(scored: &[(&str, f32)]) -> Vec<MarketPreferenceViolation> {
	let variants: Vec<ImpactFactorVariant> =
		scored.iter().map(|(name, _)| classify(name)).collect();
	let mut violations = Vec::new();

	for (market, market_variant) in variants.iter().enumerate() {
		let ImpactFactorVariant::Market { product: market_product } = market_variant else {
			continue;
		};

		for (production, production_variant) in variants.iter().enumerate() {
			let ImpactFactorVariant::Production { product } = production_variant else {
				continue;
			};

			if product == market_product && scored[market].1 < scored[production].1 {
				violations.push(MarketPreferenceViolation { market, production });
			}
		}
	}

	violations
}

fn capture_product(pattern: &LazyLock<Option<Regex>>, name: &str) -> Option<String> {
	let captures = pattern.as_ref()?.captures(name)?;
	let raw = captures.get(1)?.as_str();
	let base = raw.split(',').next().unwrap_or(raw).trim();

	if base.is_empty() {
		return None;
	}

	Some(base.to_lowercase())
}
