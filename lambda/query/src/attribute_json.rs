use std::collections::BTreeMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose, Engine as _};
use bigdecimal::BigDecimal;
use serde_json::value::{to_raw_value, RawValue};

use crate::batch::QueryError;
use crate::store::Item;

pub type JsonRecord = BTreeMap<String, Box<RawValue>>;

pub fn item_to_json(item: &Item) -> Result<JsonRecord, QueryError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), attribute_to_json(value)?)))
        .collect()
}

pub fn attribute_to_json(value: &AttributeValue) -> Result<Box<RawValue>, QueryError> {
    let json = match value {
        AttributeValue::S(s) => to_raw_value(s)?,
        AttributeValue::N(n) => number_to_json(n)?,
        AttributeValue::Bool(b) => to_raw_value(b)?,
        AttributeValue::Null(_) => to_raw_value(&())?,
        AttributeValue::B(blob) => to_raw_value(&general_purpose::STANDARD.encode(blob.as_ref()))?,
        AttributeValue::L(list) => to_raw_value(
            &list
                .iter()
                .map(attribute_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        )?,
        AttributeValue::M(map) => to_raw_value(&item_to_json(map)?)?,
        AttributeValue::Ss(set) => to_raw_value(set)?,
        AttributeValue::Ns(set) => to_raw_value(
            &set.iter()
                .map(|n| number_to_json(n))
                .collect::<Result<Vec<_>, _>>()?,
        )?,
        AttributeValue::Bs(set) => to_raw_value(
            &set.iter()
                .map(|blob| general_purpose::STANDARD.encode(blob.as_ref()))
                .collect::<Vec<_>>(),
        )?,
        _ => return Err(QueryError::UnsupportedAttribute),
    };
    Ok(json)
}

/// Whole numbers are written as integer digits at full precision, everything else as a float.
pub fn number_to_json(raw: &str) -> Result<Box<RawValue>, QueryError> {
    let invalid = || QueryError::InvalidNumber(raw.to_string());

    let decimal = BigDecimal::from_str(raw).map_err(|_| invalid())?;
    if decimal.is_integer() {
        let (digits, _) = decimal.with_scale(0).into_bigint_and_exponent();
        return Ok(RawValue::from_string(digits.to_string())?);
    }

    let float: f64 = raw.parse().map_err(|_| invalid())?;
    if !float.is_finite() {
        return Err(invalid());
    }
    Ok(to_raw_value(&float)?)
}
