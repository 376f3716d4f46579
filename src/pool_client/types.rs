use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::block::{BlockRecord, format_timestamp};

use super::error::FetchError;

/// Body of the pool blocks endpoint. Only `matured` is consulted.
#[derive(Deserialize, Debug, Default)]
pub struct PoolStats {
    pub matured: Option<Value>,
}

/// One entry of `matured`. Fields stay untyped until [`MaturedBlock::validate`]
/// so that a bad field is reported by name instead of failing the whole body.
#[derive(Deserialize, Debug, Default)]
pub struct MaturedBlock {
    pub height: Option<Value>,
    pub timestamp: Option<Value>,
    pub hash: Option<Value>,
    pub finder: Option<Value>,
}

impl PoolStats {
    /// Decodes a response body, which must be a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, FetchError> {
        let object: Map<String, Value> = serde_json::from_slice(body)?;
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// First element of `matured`, the most recent matured block.
    pub fn latest_matured(self) -> Result<MaturedBlock, FetchError> {
        let Some(Value::Array(blocks)) = self.matured else {
            return Err(FetchError::NoMaturedBlocks);
        };
        match blocks.into_iter().next() {
            Some(Value::Object(block)) => Ok(serde_json::from_value(Value::Object(block))?),
            _ => Err(FetchError::NoMaturedBlocks),
        }
    }

    pub fn into_block_record(
        self,
        coin: &str,
        offset: FixedOffset,
    ) -> Result<BlockRecord, FetchError> {
        self.latest_matured()?.validate(coin, offset)
    }
}

impl MaturedBlock {
    pub fn validate(self, coin: &str, offset: FixedOffset) -> Result<BlockRecord, FetchError> {
        let height = self
            .height
            .as_ref()
            .and_then(as_integer)
            .ok_or(FetchError::MalformedField("height"))?;
        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(as_integer)
            .and_then(|secs| format_timestamp(secs, offset))
            .ok_or(FetchError::MalformedField("timestamp"))?;
        let hash = into_string(self.hash).ok_or(FetchError::MalformedField("hash"))?;
        let finder = into_string(self.finder).ok_or(FetchError::MalformedField("finder"))?;

        Ok(BlockRecord {
            hash,
            finder,
            coin: coin.to_owned(),
            height,
            timestamp,
        })
    }
}

/// Integer value of a JSON number, truncating toward zero when fractional.
pub fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f.trunc() as i64)
    })
}

fn into_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}
