// Path: crates/tx/src/transaction.rs

use serde::{Deserialize, Serialize};
use tmpop_types::error::{LinkError, TxError};
use tmpop_types::link::Link;
use tmpop_types::LinkHash;

/// The transaction discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxType {
    /// Stores a new link.
    CreateLink = 0,
}

impl TxType {
    /// The wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TxType {
    type Error = TxError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DECODERS
            .iter()
            .map(|(t, _)| *t)
            .find(|t| t.as_u8() == value)
            .ok_or(TxError::UnknownType(value))
    }
}

/// A decoded transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    /// Store `link`, whose content hash is `link_hash`.
    CreateLink {
        /// The link to store.
        link: Link,
        /// The link's hash, computed or checked at decode time.
        link_hash: LinkHash,
    },
}

impl Transaction {
    /// Builds a CreateLink transaction, computing the link hash.
    pub fn create_link(link: Link) -> Result<Self, TxError> {
        let link_hash = link.hash()?;
        Ok(Self::CreateLink { link, link_hash })
    }

    /// The discriminant of this transaction.
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::CreateLink { .. } => TxType::CreateLink,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tx_type: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linkhash: Option<LinkHash>,
}

type Decoder = fn(Envelope) -> Result<Transaction, TxError>;

const DECODERS: &[(TxType, Decoder)] = &[(TxType::CreateLink, decode_create_link)];

fn decode_create_link(envelope: Envelope) -> Result<Transaction, TxError> {
    let link = envelope.link.ok_or(TxError::MissingLink)?;
    let computed = link.hash()?;
    if let Some(declared) = envelope.linkhash {
        if declared != computed {
            return Err(TxError::LinkHashMismatch { declared, computed });
        }
    }
    Ok(Transaction::CreateLink {
        link,
        link_hash: computed,
    })
}

/// Decodes a transaction from its wire form.
pub fn decode(bytes: &[u8]) -> Result<Transaction, TxError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| TxError::Decode(e.to_string()))?;
    let tx_type = TxType::try_from(envelope.tx_type)?;
    let decoder = DECODERS
        .iter()
        .find(|(t, _)| *t == tx_type)
        .map(|(_, d)| *d)
        .ok_or(TxError::UnknownType(envelope.tx_type))?;
    let tx = decoder(envelope)?;
    tracing::trace!(target: "tx", ?tx_type, "decoded transaction");
    Ok(tx)
}

/// Encodes a transaction into its wire form.
pub fn encode(tx: &Transaction) -> Result<Vec<u8>, TxError> {
    let envelope = match tx {
        Transaction::CreateLink { link, link_hash } => Envelope {
            tx_type: TxType::CreateLink.as_u8(),
            link: Some(link.clone()),
            linkhash: Some(*link_hash),
        },
    };
    serde_json::to_vec(&envelope).map_err(|e| TxError::Link(LinkError::Encode(e.to_string())))
}
