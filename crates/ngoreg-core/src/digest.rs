//! # Zone-Set Digest
//!
//! A SHA-256 fingerprint of a zone set's canonical bytes. Two flat lists have
//! the same digest exactly when their canonical serializations are equal.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;
use crate::zone::ZoneNode;

/// SHA-256 over `CanonicalBytes::for_zone_set`. Serializes as 64 lowercase
/// hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ZoneSetDigest(pub [u8; 32]);

impl ZoneSetDigest {
    /// Digest canonical bytes. Only `CanonicalBytes` is accepted so every
    /// digest goes through the same serialization.
    pub fn of(data: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(data.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse 64 hex characters, with or without the `sha256:` prefix.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix("sha256:").unwrap_or(s);
        if hex.len() != 64 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl From<ZoneSetDigest> for String {
    fn from(d: ZoneSetDigest) -> Self {
        d.to_hex()
    }
}

impl TryFrom<String> for ZoneSetDigest {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s).ok_or_else(|| format!("invalid zone-set digest '{s}'"))
    }
}

impl std::fmt::Display for ZoneSetDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Canonicalize and digest a flat zone list.
pub fn zone_set_digest(nodes: &[ZoneNode]) -> Result<ZoneSetDigest, CanonicalizationError> {
    let cb = CanonicalBytes::for_zone_set(nodes)?;
    Ok(ZoneSetDigest::of(&cb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_64_lowercase_chars() {
        let d = zone_set_digest(&[ZoneNode::region("Dakar")]).unwrap();
        let hex = d.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(d.to_string().starts_with("sha256:"));
    }

    #[test]
    fn hex_round_trips_through_serde() {
        let d = zone_set_digest(&[ZoneNode::region("Dakar")]).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
        let back: ZoneSetDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert_eq!(ZoneSetDigest::from_hex(&d.to_string()), Some(d));
        assert_eq!(ZoneSetDigest::from_hex("abc"), None);
    }

    #[test]
    fn different_sets_differ() {
        let a = zone_set_digest(&[ZoneNode::region("Dakar")]).unwrap();
        let b = zone_set_digest(&[ZoneNode::region("Thiès")]).unwrap();
        assert_ne!(a, b);
    }
}
