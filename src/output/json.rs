//! JSON output
//!
//! Every `--format json` payload is wrapped as `{data, meta}` so scripts can
//! tell which daybook build produced it and when.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Borrowed `{data, meta}` envelope
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: ?Sized> {
    pub data: &'a T,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    #[serde(serialize_with = "rfc3339_secs")]
    pub timestamp: DateTime<Utc>,

    /// daybook version
    pub version: &'static str,
}

impl<'a, T: ?Sized> Envelope<'a, T> {
    pub fn new(data: &'a T) -> Self {
        Self {
            data,
            meta: Meta {
                timestamp: Utc::now(),
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

fn rfc3339_secs<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Pretty-printed JSON inside the envelope
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope::new(data))
}

/// Print data as enveloped JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> crate::error::Result<()> {
    println!("{}", format_json(data)?);
    Ok(())
}
