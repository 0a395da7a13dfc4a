use std::{borrow::Cow, time::Duration};

use serde::{de, Deserialize, Deserializer};
use url::Url;

pub fn deser_duration_from_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    let number = <u64>::deserialize(deserializer)?;
    Ok(Duration::from_millis(number))
}

/// Floats encoded as strings. `null`, an empty string or garbage become
/// `None` instead of failing the whole payload.
pub fn deser_opt_float_from_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    let string_value = Option::<Cow<str>>::deserialize(deserializer)?;
    Ok(string_value
        .and_then(|s| s.as_ref().trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

pub fn deserialize_url<'de, D: Deserializer<'de>>(deser: D) -> Result<Url, D::Error> {
    let s = Cow::<str>::deserialize(deser)?;
    s.as_ref().parse().map_err(de::Error::custom)
}
