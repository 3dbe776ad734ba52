use std::fmt;

use serde::{Serialize, Serializer};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integer pack id as read from the datasets, coerced like a JavaScript
/// `Number`: blank text is `0` and `1.0` is `1`. Anything that is not a whole
/// number, or a missing column, becomes `NaN`, which renders as `NaN` and
/// never equals any id.
#[derive(Debug, Clone, Copy)]
pub enum PackId {
    Id(i64),
    NaN,
}

impl PackId {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return PackId::Id(0);
        }
        if let Ok(id) = raw.parse::<i64>() {
            return PackId::Id(id);
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                PackId::Id(n as i64)
            }
            _ => PackId::NaN,
        }
    }

    /// A missing column is `NaN`, not `0`.
    pub fn from_field(raw: Option<&str>) -> Self {
        raw.map_or(PackId::NaN, PackId::parse)
    }

    pub fn value(self) -> Option<i64> {
        match self {
            PackId::Id(id) => Some(id),
            PackId::NaN => None,
        }
    }
}

impl PartialEq for PackId {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (PackId::Id(a), PackId::Id(b)) if a == b)
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackId::Id(id) => write!(f, "{}", id),
            PackId::NaN => f.write_str("NaN"),
        }
    }
}

impl Serialize for PackId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PackId::Id(id) => serializer.serialize_i64(*id),
            PackId::NaN => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pack {
    pub id: PackId,
    pub title: String,
}

/// A joined, display-ready emoticon. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoticonRecord {
    pub pack_id: PackId,
    /// Resolved pack title or `UNKNOWN_<packId>`.
    pub pack_title: String,
    /// File name of the image, shown as the display name.
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub img_src: String,
    pub img_verified: bool,
}

pub fn unknown_pack_title(id: PackId) -> String {
    format!("UNKNOWN_{}", id)
}
