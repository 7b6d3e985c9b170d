//! Marker pagination.
//!
//! Listing commands accept an optional marker; each page may carry a marker
//! for the next one. The marker keeps the exact JSON text the node sent and
//! is echoed byte-for-byte, never parsed or inspected. A page without a
//! marker ends the listing.

use crate::commands::requests::{
    AccountLinesRequest, AccountOffersRequest, AccountTxRequest, BinaryLedgerDataRequest,
    LedgerDataRequest,
};
use crate::commands::results::{
    AccountLinesResult, AccountOffersResult, AccountTxResult, BinaryLedgerDataResult,
    LedgerDataResult,
};
use crate::commands::Command;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

/// Opaque continuation token.
///
/// Holds the raw JSON text of the node's marker. It only deserialises from
/// JSON text, not from an already parsed [`Value`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(Box<RawValue>);

impl Marker {
    /// Marker from JSON text, kept exactly as given.
    pub fn from_json(text: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(text.into()).map(Self)
    }

    /// The marker's JSON text.
    pub fn as_json(&self) -> &str {
        self.0.get()
    }

    /// Parsed copy for inspection. Numbers beyond `f64` precision lose
    /// digits here; the marker itself does not.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self.0.get())
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.as_json() == other.as_json()
    }
}

impl Eq for Marker {}

/// A listing command whose pages are chained by a [`Marker`].
pub trait Paginated: Command + Clone {
    /// Marker this request resumes from.
    fn marker(&self) -> Option<&Marker>;

    fn set_marker(&mut self, marker: Option<Marker>);

    /// Marker carried by a page, if more pages follow.
    fn next_marker(page: &Self::Output) -> Option<&Marker>;
}

/// The request for the page after `page`, or `None` when the listing is
/// exhausted.
pub fn next_request<C: Paginated>(previous: &C, page: &C::Output) -> Option<C> {
    let marker = C::next_marker(page)?.clone();
    let mut next = previous.clone();
    next.set_marker(Some(marker));
    Some(next)
}

macro_rules! impl_paginated {
    ($($request:ty => $result:ty),* $(,)?) => {
        $(
            impl Paginated for $request {
                fn marker(&self) -> Option<&Marker> {
                    self.marker.as_ref()
                }

                fn set_marker(&mut self, marker: Option<Marker>) {
                    self.marker = marker;
                }

                fn next_marker(page: &$result) -> Option<&Marker> {
                    page.marker.as_ref()
                }
            }
        )*
    };
}

impl_paginated! {
    AccountTxRequest => AccountTxResult,
    LedgerDataRequest => LedgerDataResult,
    BinaryLedgerDataRequest => BinaryLedgerDataResult,
    AccountLinesRequest => AccountLinesResult,
    AccountOffersRequest => AccountOffersResult,
}
