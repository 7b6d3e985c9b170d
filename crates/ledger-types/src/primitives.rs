//! # Ledger Value Types
//!
//! Identifiers, amounts, hashes and timestamps as the node renders them in
//! JSON. Each type parses from its wire text and renders back through
//! `Display`, which is also what it serialises to.

use crate::errors::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

/// Characters of the ledger's base58 dictionary.
const ACCOUNT_ALPHABET: &str = "rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
pub const RIPPLE_EPOCH_OFFSET: i64 = 946_684_800;

/// Drops per whole native unit.
pub const DROPS_PER_UNIT: u64 = 1_000_000;

// =============================================================================
// HASHES AND BLOBS
// =============================================================================

/// A 256-bit hash (transaction id, ledger hash, ledger index).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl FromStr for Hash256 {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ModelError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self)
    }
}

/// Arbitrary-length bytes carried as hex text (keys, signatures, headers).
#[derive(Debug, Clone, PartialEq, Eq, Default, SerializeDisplay, DeserializeFromStr)]
pub struct VariableLength(pub Vec<u8>);

impl VariableLength {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for VariableLength {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| ModelError::InvalidHex(e.to_string()))
    }
}

impl fmt::Display for VariableLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

// =============================================================================
// ACCOUNTS AND CURRENCIES
// =============================================================================

/// A classic `r...` account address.
///
/// Only the textual form is validated (dictionary and length); the checksum
/// is the node's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Account(String);

impl Account {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Account {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with('r') || !(25..=35).contains(&s.len()) {
            return Err(ModelError::InvalidAccount(s.to_string()));
        }
        if let Some(bad) = s.chars().find(|c| !ACCOUNT_ALPHABET.contains(*c)) {
            return Err(ModelError::InvalidAccount(format!(
                "{s}: unexpected character {bad:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Currency code: `XRP`, a three-character ISO-style code, or 40 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Currency(String);

impl Currency {
    pub fn native() -> Self {
        Self("XRP".to_string())
    }

    pub fn is_native(&self) -> bool {
        self.0 == "XRP"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let standard = s.len() == 3 && s.chars().all(|c| c.is_ascii_alphanumeric());
        let hashed = s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit());
        if standard || hashed {
            Ok(Self(s.to_string()))
        } else {
            Err(ModelError::InvalidCurrency(s.to_string()))
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// QUANTITIES
// =============================================================================

/// Decimal quantity kept as its wire text (`"1.5"`, `"-2"`, `"1e-3"`).
#[derive(Debug, Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Value(String);

impl Value {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }
}

impl FromStr for Value {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidValue(s.to_string());
        let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
            None => (unsigned, None),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits_ok = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (int.is_empty() && frac.is_empty()) || !digits_ok(int) || !digits_ok(frac) {
            return Err(invalid());
        }
        if let Some(exp) = exponent {
            let exp = exp.strip_prefix(['-', '+']).unwrap_or(exp);
            if exp.is_empty() || !digits_ok(exp) {
                return Err(invalid());
            }
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native amount in drops. Travels as integer drop text, renders in whole
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Drops(pub u64);

impl Drops {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for Drops {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidDrops(s.to_string()))
    }
}

impl Serialize for Drops {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Drops {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Drops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / DROPS_PER_UNIT;
        let frac = self.0 % DROPS_PER_UNIT;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac = format!("{frac:06}");
            write!(f, "{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}

/// An amount of either the native asset or an issued currency.
///
/// On the wire a native amount is a string of drops and an issued amount is
/// an object with `value`, `currency` and `issuer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Native(Drops),
    Issued {
        value: Value,
        currency: Currency,
        issuer: Account,
    },
}

impl Amount {
    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Native(_))
    }

    pub fn currency(&self) -> Currency {
        match self {
            Amount::Native(_) => Currency::native(),
            Amount::Issued { currency, .. } => currency.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Native(String),
    Issued {
        value: Value,
        currency: Currency,
        issuer: Account,
    },
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Amount::Native(drops) => AmountRepr::Native(drops.0.to_string()),
            Amount::Issued {
                value,
                currency,
                issuer,
            } => AmountRepr::Issued {
                value: value.clone(),
                currency: currency.clone(),
                issuer: issuer.clone(),
            },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Native(text) => text
                .parse::<Drops>()
                .map(Amount::Native)
                .map_err(serde::de::Error::custom),
            AmountRepr::Issued {
                value,
                currency,
                issuer,
            } => Ok(Amount::Issued {
                value,
                currency,
                issuer,
            }),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Native(drops) => write!(f, "{drops}/XRP"),
            Amount::Issued {
                value,
                currency,
                issuer,
            } => write!(f, "{value}/{currency}/{issuer}"),
        }
    }
}

/// One side of an order book: a currency and, unless native, its issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Account>,
}

impl Asset {
    pub fn native() -> Self {
        Self {
            currency: Currency::native(),
            issuer: None,
        }
    }

    pub fn issued(currency: Currency, issuer: Account) -> Self {
        Self {
            currency,
            issuer: Some(issuer),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issuer {
            Some(issuer) => write!(f, "{}/{}", self.currency, issuer),
            None => write!(f, "{}", self.currency),
        }
    }
}

// =============================================================================
// TIME
// =============================================================================

/// Seconds since 2000-01-01T00:00:00Z, the ledger's close-time epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RippleTime(pub u32);

impl RippleTime {
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(self.0) + RIPPLE_EPOCH_OFFSET, 0)
    }
}

impl fmt::Display for RippleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(at) => write!(f, "{}", at.format("%Y-%b-%d %H:%M:%S UTC")),
            None => write!(f, "{}", self.0),
        }
    }
}
