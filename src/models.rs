use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend-assigned listing identifier
pub type TurfId = u64;

/// A turf listing as served by the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turf {
    pub id: TurfId,
    pub name: String,
    pub location: String,
    #[serde(default, deserialize_with = "de_nullable_string")]
    pub description: String,
    /// Server-relative path of the listing image
    #[serde(default, deserialize_with = "de_nullable_string")]
    pub image_url: String,
    #[serde(deserialize_with = "de_price")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pitches: Option<u32>,
    #[serde(default, deserialize_with = "de_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Turf {
    /// Merge the fields present in `patch` over this listing. The id is never touched.
    pub fn merge(&mut self, patch: &TurfPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(pitches) = patch.number_of_pitches {
            self.number_of_pitches = Some(pitches);
        }
        if patch.updated_at.is_some() {
            self.updated_at = patch.updated_at;
        }
    }
}

/// Partial listing used for updates. Absent fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TurfPatch {
    /// Only accepted when it matches the listing being patched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TurfId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pitches: Option<u32>,
    /// Server timestamp of a confirmed edit. Never sent.
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TurfPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.price.is_none()
            && self.number_of_pitches.is_none()
    }
}

impl From<Turf> for TurfPatch {
    /// Full patch carrying every field of a server-confirmed listing
    fn from(turf: Turf) -> Self {
        TurfPatch {
            id: Some(turf.id),
            name: Some(turf.name),
            location: Some(turf.location),
            description: Some(turf.description),
            image_url: Some(turf.image_url),
            price: Some(turf.price),
            number_of_pitches: turf.number_of_pitches,
            updated_at: turf.updated_at,
        }
    }
}

/// A new listing waiting to be created
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurfDraft {
    pub name: String,
    pub location: String,
    pub description: String,
    pub price: f64,
    pub number_of_pitches: Option<u32>,
    /// Local file uploaded as the listing image
    pub image_path: Option<std::path::PathBuf>,
}

/// Explicit API credentials handed to the listing source
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: Option<String>,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials {
            token: Some(token.into()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.as_deref().map_or(true, str::is_empty)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// List payloads come back either bare or wrapped in a paginator object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PageBody {
    Bare(Vec<Turf>),
    Wrapped { data: Vec<Turf> },
}

impl PageBody {
    pub fn into_items(self) -> Vec<Turf> {
        match self {
            PageBody::Bare(items) => items,
            PageBody::Wrapped { data } => data,
        }
    }
}

/// Single-listing payloads, bare or wrapped in `data`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemBody {
    Wrapped { data: Turf },
    Bare(Turf),
}

impl ItemBody {
    pub fn into_item(self) -> Turf {
        match self {
            ItemBody::Wrapped { data } => data,
            ItemBody::Bare(turf) => turf,
        }
    }
}

/// Whole prices print without decimals, everything else with two
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    }
}

/// Decimal columns are often serialized as strings ("300.00")
fn de_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    let price = match Price::deserialize(deserializer)? {
        Price::Number(n) => n,
        Price::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid price {:?}: {}", s, e)))?,
    };

    if price < 0.0 || !price.is_finite() {
        return Err(serde::de::Error::custom(format!("price out of range: {}", price)));
    }
    Ok(price)
}

/// Nullable text columns come back as `null`
fn de_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps are informational; unparseable ones are dropped rather than
/// failing the whole listing
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|t| t.and_utc())
        })
}

#[cfg(test)]
pub(crate) fn sample_turf(id: TurfId, price: f64) -> Turf {
    Turf {
        id,
        name: format!("Turf {}", id),
        location: String::from("Westlands"),
        description: String::from("Five-a-side astro"),
        image_url: format!("/storage/turfs/{}.jpg", id),
        price,
        number_of_pitches: Some(2),
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_string_price_and_wrapped_page() {
        let body = r#"{"current_page":1,"data":[
            {"id":7,"name":"Arena","location":"Kilimani","description":"Lit at night",
             "image_url":"/storage/a.jpg","price":"300.00","created_at":"2024-05-01T10:00:00Z"}
        ]}"#;
        let items = serde_json::from_str::<PageBody>(body).unwrap().into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);
        assert_eq!(items[0].price, 300.0);
        assert!(items[0].created_at.is_some());
    }

    #[test]
    fn test_decode_bare_page() {
        let body = r#"[{"id":1,"name":"A","location":"B","price":120}]"#;
        let items = serde_json::from_str::<PageBody>(body).unwrap().into_items();
        assert_eq!(items[0].description, "");
        assert_eq!(items[0].price, 120.0);
    }

    #[test]
    fn test_decode_null_text_columns() {
        let body = r#"{"data":[
            {"id":1,"name":"A","location":"B","description":null,"image_url":null,"price":"300.00"},
            {"id":2,"name":"C","location":"D","description":"Indoor","image_url":"/x.jpg","price":"150.00"}
        ]}"#;
        let items = serde_json::from_str::<PageBody>(body).unwrap().into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].image_url, "");
        assert_eq!(items[0].description, "");
        assert_eq!(items[1].image_url, "/x.jpg");
    }

    #[test]
    fn test_timestamp_formats() {
        let body = r#"{"id":1,"name":"A","location":"B","price":1,
            "created_at":"2024-05-01 10:00:00","updated_at":"yesterday"}"#;
        let turf = serde_json::from_str::<Turf>(body).unwrap();
        assert_eq!(
            turf.created_at.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00+00:00"
        );
        assert!(turf.updated_at.is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let body = r#"{"id":1,"name":"A","location":"B","price":-5}"#;
        assert!(serde_json::from_str::<Turf>(body).is_err());
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut turf = sample_turf(1, 300.0);
        turf.merge(&TurfPatch {
            price: Some(500.0),
            ..Default::default()
        });
        assert_eq!(turf.price, 500.0);
        assert_eq!(turf.name, "Turf 1");
        assert_eq!(turf.location, "Westlands");
    }

    #[test]
    fn test_confirmed_listing_carries_updated_at() {
        let mut confirmed = sample_turf(1, 500.0);
        confirmed.updated_at = parse_timestamp("2024-06-01T08:30:00Z");

        let patch = TurfPatch::from(confirmed.clone());
        assert!(!serde_json::to_string(&patch).unwrap().contains("updated_at"));

        let mut cached = sample_turf(1, 300.0);
        cached.merge(&patch);
        assert_eq!(cached.updated_at, confirmed.updated_at);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = TurfPatch {
            name: Some(String::from("Renamed")),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"name":"Renamed"}"#);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(300.0), "300");
        assert_eq!(format_price(299.5), "299.50");
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials::bearer("secret-token");
        assert!(!format!("{:?}", creds).contains("secret-token"));
        assert!(Credentials::default().is_anonymous());
    }
}
