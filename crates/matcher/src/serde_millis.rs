//! `Duration` fields written as integer milliseconds.
//!
//! Reading also accepts `"250ms"` / `"5s"` strings, which read better in
//! config files.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Millis {
    Count(u64),
    Text(String),
}

pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    match Millis::deserialize(deserializer)? {
        Millis::Count(ms) => Ok(Duration::from_millis(ms)),
        Millis::Text(text) => parse(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid duration `{text}`"))),
    }
}

fn parse(text: &str) -> Option<Duration> {
    let text = text.trim();
    if let Some(ms) = text.strip_suffix("ms") {
        return ms.trim().parse().ok().map(Duration::from_millis);
    }
    if let Some(secs) = text.strip_suffix('s') {
        return secs.trim().parse().ok().map(Duration::from_secs);
    }
    text.parse().ok().map(Duration::from_millis)
}
