//! Value bundles, datums, redeemers and transaction metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Policy -> asset name -> quantity, in wire order.
///
/// Entries are kept exactly as received: no merging of repeated policies or
/// asset names and no sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAsset<T> {
    policies: Vec<(Vec<u8>, Vec<(Vec<u8>, T)>)>,
}

/// Minted (positive) or burned (negative) quantities.
pub type Mint = MultiAsset<i64>;

impl<T: Copy> MultiAsset<T> {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Append a policy with its assets.
    pub fn push_policy(&mut self, policy: Vec<u8>, assets: Vec<(Vec<u8>, T)>) {
        self.policies.push((policy, assets));
    }

    /// Iterate policies in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[(Vec<u8>, T)])> {
        self.policies
            .iter()
            .map(|(policy, assets)| (policy.as_slice(), assets.as_slice()))
    }

    /// First quantity recorded for `(policy, asset)`.
    pub fn get(&self, policy: &[u8], asset: &[u8]) -> Option<T> {
        self.policies
            .iter()
            .filter(|(p, _)| p.as_slice() == policy)
            .flat_map(|(_, assets)| assets.iter())
            .find(|(name, _)| name.as_slice() == asset)
            .map(|(_, quantity)| *quantity)
    }

    /// Number of policy entries.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl<T: Copy> Default for MultiAsset<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A bundle of funds: base coin plus native assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub coin: u64,
    pub multi_asset: MultiAsset<u64>,
}

impl Value {
    /// Coin only, no native assets.
    pub fn coin(coin: u64) -> Self {
        Self {
            coin,
            multi_asset: MultiAsset::new(),
        }
    }
}

/// How a datum is attached to an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DatumKind {
    /// The output carries the datum hash only.
    Hash = 1,
    /// The output carries the datum itself.
    Inline = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datum {
    pub kind: DatumKind,
    pub payload: Vec<u8>,
}

/// What a redeemer unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedeemerTag {
    Spend,
    Mint,
    Cert,
    Reward,
    Vote,
    Propose,
    /// A tag this crate does not know by name, kept verbatim.
    Other(u8),
}

impl RedeemerTag {
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            0 => RedeemerTag::Spend,
            1 => RedeemerTag::Mint,
            2 => RedeemerTag::Cert,
            3 => RedeemerTag::Reward,
            4 => RedeemerTag::Vote,
            5 => RedeemerTag::Propose,
            other => RedeemerTag::Other(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            RedeemerTag::Spend => 0,
            RedeemerTag::Mint => 1,
            RedeemerTag::Cert => 2,
            RedeemerTag::Reward => 3,
            RedeemerTag::Vote => 4,
            RedeemerTag::Propose => 5,
            RedeemerTag::Other(other) => other,
        }
    }
}

/// Execution budget granted to a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExUnits {
    pub mem: u64,
    pub steps: u64,
}

/// Script-validation witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redeemer {
    pub tag: RedeemerTag,
    pub index: u32,
    pub data: Vec<u8>,
    pub ex_units: ExUnits,
}

/// Transaction metadata, kept as the structured CBOR it arrived as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata(pub ciborium::Value);

impl Metadata {
    pub fn as_cbor(&self) -> &ciborium::Value {
        &self.0
    }

    /// Render as JSON.
    ///
    /// Total: byte strings become hex strings, non-text map keys become
    /// their JSON text, integers outside the 64-bit range become decimal
    /// strings, and non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        cbor_to_json(&self.0)
    }
}

fn cbor_to_json(value: &ciborium::Value) -> JsonValue {
    use ciborium::Value as Cbor;

    match value {
        Cbor::Integer(i) => {
            let wide = i128::from(*i);
            if let Ok(n) = i64::try_from(wide) {
                JsonValue::from(n)
            } else if let Ok(n) = u64::try_from(wide) {
                JsonValue::from(n)
            } else {
                JsonValue::String(wide.to_string())
            }
        }
        Cbor::Bytes(b) => JsonValue::String(hex::encode(b)),
        Cbor::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Cbor::Text(s) => JsonValue::String(s.clone()),
        Cbor::Bool(b) => JsonValue::Bool(*b),
        Cbor::Null => JsonValue::Null,
        Cbor::Tag(_, inner) => cbor_to_json(inner),
        Cbor::Array(items) => JsonValue::Array(items.iter().map(cbor_to_json).collect()),
        Cbor::Map(entries) => {
            let mut object = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                let key = match k {
                    Cbor::Text(s) => s.clone(),
                    other => cbor_to_json(other).to_string(),
                };
                object.insert(key, cbor_to_json(v));
            }
            JsonValue::Object(object)
        }
        _ => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::Value as Cbor;

    #[test]
    fn test_multi_asset_preserves_duplicates_and_order() {
        let mut ma = MultiAsset::<u64>::new();
        ma.push_policy(vec![2], vec![(b"b".to_vec(), 5), (b"a".to_vec(), 1)]);
        ma.push_policy(vec![1], vec![(b"x".to_vec(), 7)]);
        ma.push_policy(vec![2], vec![(b"b".to_vec(), 9)]);

        let policies: Vec<_> = ma.iter().map(|(p, _)| p.to_vec()).collect();
        assert_eq!(policies, vec![vec![2], vec![1], vec![2]]);
        assert_eq!(ma.len(), 3);
        assert_eq!(ma.get(&[2], b"b"), Some(5));
        assert_eq!(ma.get(&[1], b"x"), Some(7));
        assert_eq!(ma.get(&[3], b"x"), None);
    }

    #[test]
    fn test_coin_only_value() {
        let value = Value::coin(2_000_000);
        assert_eq!(value.coin, 2_000_000);
        assert!(value.multi_asset.is_empty());
    }

    #[test]
    fn test_mint_allows_burns() {
        let mut mint = Mint::new();
        mint.push_policy(vec![9], vec![(b"tok".to_vec(), -40)]);
        assert_eq!(mint.get(&[9], b"tok"), Some(-40));
    }

    #[test]
    fn test_redeemer_tag_codes() {
        for code in 0u8..=10 {
            assert_eq!(RedeemerTag::from_u8(code).to_u8(), code);
        }
        assert_eq!(RedeemerTag::from_u8(1), RedeemerTag::Mint);
        assert_eq!(RedeemerTag::from_u8(200), RedeemerTag::Other(200));
    }

    #[test]
    fn test_metadata_to_json() {
        let metadata = Metadata(Cbor::Map(vec![
            (
                Cbor::Integer(674.into()),
                Cbor::Map(vec![(
                    Cbor::Text("msg".into()),
                    Cbor::Array(vec![Cbor::Text("hello".into())]),
                )]),
            ),
            (Cbor::Integer(1.into()), Cbor::Bytes(vec![0xde, 0xad])),
        ]));

        let json = metadata.to_json();
        assert_eq!(json["674"]["msg"][0], "hello");
        assert_eq!(json["1"], "dead");
    }

    #[test]
    fn test_metadata_large_negative_integer() {
        let big = ciborium::value::Integer::try_from(-(1i128 << 64)).unwrap();
        let metadata = Metadata(Cbor::Integer(big));
        assert_eq!(metadata.to_json(), JsonValue::String((-(1i128 << 64)).to_string()));
    }
}
