//! Payment paths as returned by path finding and carried by payments.

use crate::primitives::{Account, Currency};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One hop of a payment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathElem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Account>,
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.account, &self.currency, &self.issuer) {
            (Some(account), _, _) => write!(f, "{account}"),
            (None, Some(currency), Some(issuer)) => write!(f, "{currency}/{issuer}"),
            (None, Some(currency), None) => write!(f, "{currency}"),
            (None, None, Some(issuer)) => write!(f, "{issuer}"),
            (None, None, None) => f.write_str("?"),
        }
    }
}

/// An ordered list of hops.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElem>);

impl Path {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" => ")?;
            }
            write!(f, "{elem}")?;
        }
        Ok(())
    }
}

/// Alternative paths for one payment.
pub type PathSet = Vec<Path>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path: Path = serde_json::from_value(serde_json::json!([
            { "currency": "XRP" },
            { "currency": "SGD", "issuer": "r9Dr5xwkeLegBeXq6ujinjSBLQzQ1zQGjH" }
        ]))
        .unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "XRP => SGD/r9Dr5xwkeLegBeXq6ujinjSBLQzQ1zQGjH");
    }
}
