// Identifier types shared by dashboards, canvases, entities and devices
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Canonical identifier as handed out by the console backend.
///
/// The backend is inconsistent about whether ids travel as JSON strings or
/// JSON numbers, so every id is normalized once into a trimmed string here
/// and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// Normalize a raw identifier. Returns `None` for blank input.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::normalize(s),
            serde_json::Value::Number(n) => match (n.as_u64(), n.as_i64()) {
                (Some(v), _) => Some(Self(v.to_string())),
                (None, Some(v)) => Some(Self(v.to_string())),
                (None, None) => n.as_f64().and_then(Self::from_f64),
            },
            _ => None,
        }
    }

    /// Whole floats (`12.0`) are accepted; fractions and non-finite values are not ids.
    fn from_f64(v: f64) -> Option<Self> {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        (v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT).then(|| Self(format!("{}", v as i64)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct ApiKeyVisitor;

impl<'de> Visitor<'de> for ApiKeyVisitor {
    type Value = ApiKey;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-empty string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ApiKey, E> {
        ApiKey::normalize(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ApiKey, E> {
        Ok(ApiKey(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ApiKey, E> {
        Ok(ApiKey(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ApiKey, E> {
        ApiKey::from_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }
}

/// `deserialize_with` helper for optional ids in backend records: null, blank
/// and malformed values read as absent instead of failing the whole payload.
pub fn lenient_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<ApiKey>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(ApiKey::from_json(&value).map(T::from))
}

/// Like [`lenient_id`] for id lists; unusable entries are dropped.
pub fn lenient_id_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: From<ApiKey>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(ApiKey::from_json).map(T::from).collect()))
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ApiKeyVisitor)
    }
}

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub ApiKey);

        impl $name {
            pub fn parse(raw: &str) -> Option<Self> {
                ApiKey::normalize(raw).map(Self)
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<ApiKey> for $name {
            fn from(key: ApiKey) -> Self {
                Self(key)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

typed_id!(DashboardId);
typed_id!(CanvasId);
typed_id!(EntityId);
typed_id!(DeviceId);

impl From<DashboardId> for CanvasId {
    fn from(id: DashboardId) -> Self {
        CanvasId(id.0)
    }
}
