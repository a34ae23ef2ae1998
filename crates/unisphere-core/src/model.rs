//! Wire types for the RFP detail and bid comparison endpoints.
//!
//! The backend is authoritative: every type here is read-only data as the
//! server produced it. Nullable columns come through as JSON `null`, so most
//! string and collection fields fall back to their default on `null`.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// Server-side primary key.
pub type RecordId = u64;

/// Lowest and highest value a score can take.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Interpret a raw score inside `[0, 100]`.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return SCORE_MIN;
    }
    score.clamp(SCORE_MIN, SCORE_MAX)
}

/// Treat JSON `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Requirements ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Must-have")]
    MustHave,
    #[serde(rename = "Should-have")]
    ShouldHave,
    #[serde(rename = "Nice-to-have")]
    NiceToHave,
    /// Any label the three buckets do not cover.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Priority {
    /// The three tallied buckets, in display order.
    pub const BUCKETS: [Priority; 3] = [Self::MustHave, Self::ShouldHave, Self::NiceToHave];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MustHave => "Must-have",
            Self::ShouldHave => "Should-have",
            Self::NiceToHave => "Nice-to-have",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RecordId,
    /// Grouping key. Absent in comparison payloads, where the map key carries it.
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSpec {
    pub id: RecordId,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub measurement_unit: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_mandatory: bool,
}

// ── RFP ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfpHeader {
    pub id: RecordId,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub agency: String,
    #[serde(default, deserialize_with = "nullable")]
    pub project_id: String,
}

/// Response of `GET /api/rfp/{id}`.
///
/// Accepts the header either at the top level or nested under `"rfp"`;
/// serializes flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RfpDetailWire")]
pub struct RfpDetail {
    #[serde(flatten)]
    pub rfp: RfpHeader,
    pub requirements: Vec<Requirement>,
    pub technical_specifications: Vec<TechSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RfpDetailWire {
    Nested {
        rfp: RfpHeader,
        #[serde(default, deserialize_with = "nullable")]
        requirements: Vec<Requirement>,
        #[serde(default, deserialize_with = "nullable")]
        technical_specifications: Vec<TechSpec>,
    },
    Flat {
        #[serde(flatten)]
        rfp: RfpHeader,
        #[serde(default, deserialize_with = "nullable")]
        requirements: Vec<Requirement>,
        #[serde(default, deserialize_with = "nullable")]
        technical_specifications: Vec<TechSpec>,
    },
}

impl From<RfpDetailWire> for RfpDetail {
    fn from(wire: RfpDetailWire) -> Self {
        match wire {
            RfpDetailWire::Nested {
                rfp,
                requirements,
                technical_specifications,
            }
            | RfpDetailWire::Flat {
                rfp,
                requirements,
                technical_specifications,
            } => Self {
                rfp,
                requirements,
                technical_specifications,
            },
        }
    }
}

impl RfpDetail {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ── Bids ──

/// One entry of a bid's compliance map. A `null` entry reads as unscored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<ComplianceEntryWire>")]
pub struct ComplianceEntry {
    pub score: Option<f64>,
}

#[derive(Deserialize)]
struct ComplianceEntryWire {
    #[serde(default)]
    score: Option<f64>,
}

impl From<Option<ComplianceEntryWire>> for ComplianceEntry {
    fn from(wire: Option<ComplianceEntryWire>) -> Self {
        Self {
            score: wire.and_then(|w| w.score),
        }
    }
}

impl ComplianceEntry {
    pub fn score(&self) -> Option<f64> {
        self.score.map(clamp_score)
    }
}

/// Compliance scores keyed by the decimal id of a requirement or specification.
pub type ComplianceMap = HashMap<String, ComplianceEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: RecordId,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_name: String,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub requirement_compliance: ComplianceMap,
    #[serde(default, deserialize_with = "nullable")]
    pub technical_compliance: ComplianceMap,
    #[serde(default, deserialize_with = "nullable")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub weaknesses: Vec<String>,
}

impl Bid {
    /// Overall score within `[0, 100]`, if the server computed one.
    pub fn total_score(&self) -> Option<f64> {
        self.total_score.map(clamp_score)
    }

    pub fn requirement_score(&self, requirement_id: RecordId) -> Option<f64> {
        self.requirement_compliance
            .get(&requirement_id.to_string())
            .and_then(ComplianceEntry::score)
    }

    pub fn technical_score(&self, spec_id: RecordId) -> Option<f64> {
        self.technical_compliance
            .get(&spec_id.to_string())
            .and_then(ComplianceEntry::score)
    }
}

// ── Comparison ──

/// Response of `GET /api/reports/comparison/{id}`.
///
/// An RFP without bids comes back as `{"message": ...}`, which reads as an
/// empty comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonData {
    #[serde(default)]
    pub rfp: Option<RfpHeader>,
    #[serde(default, deserialize_with = "nullable")]
    pub bids: Vec<Bid>,
    #[serde(default, deserialize_with = "nullable")]
    pub requirement_categories: CategoryMap<Requirement>,
    #[serde(default, deserialize_with = "nullable")]
    pub technical_categories: CategoryMap<TechSpec>,
}

impl ComparisonData {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ── Ordered category map ──

/// Category → items, in first-seen category order.
///
/// Serialized as a JSON object; a repeated key appends to the existing group.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap<T> {
    groups: Vec<(String, Vec<T>)>,
}

impl<T> Default for CategoryMap<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T> CategoryMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to `category`, opening the group if it is new.
    pub fn push(&mut self, category: &str, item: T) {
        match self.groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, items)) => items.push(item),
            None => self.groups.push((category.to_string(), vec![item])),
        }
    }

    fn extend_group(&mut self, category: String, items: Vec<T>) {
        match self.groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => existing.extend(items),
            None => self.groups.push((category, items)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, items)| items.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.groups
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|(_, items)| items.len()).sum()
    }
}

impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, items) in &self.groups {
            map.serialize_entry(name, items)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CategoryMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for CategoryMapVisitor<T> {
            type Value = CategoryMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to a list of items")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = CategoryMap::new();
                while let Some((name, items)) = access.next_entry::<String, Vec<T>>()? {
                    map.extend_group(name, items);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor(PhantomData))
    }
}
