//! Opaque pagination cursors
//!
//! Encodes a (limit, offset) window into a token that is opaque to
//! clients but reversible by the server. The token is informational, not
//! an access-control secret, so plain base64 over a versioned payload is
//! enough; the version tag leaves room to change the layout without
//! breaking tokens already handed out.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::types::{Error, Result};

/// Payload version tag. Bump when the encoded layout changes.
const VERSION: &str = "c1";

/// Decoded pagination window.
///
/// Invariants: `limit > 0`, enforced on every decode path. Malformed
/// tokens fail fast with [`Error::InvalidCursor`] rather than silently
/// defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    /// Page size requested by the caller
    pub limit: u32,
    /// Number of records already consumed
    pub offset: u64,
}

impl CursorState {
    /// Create a window at the start of the collection
    pub fn first_page(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    /// The window immediately after this one
    pub fn advance(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + u64::from(self.limit),
        }
    }

    /// Token for the next page, given how many items this page returned.
    ///
    /// A short page (`result_count < limit`) signals end-of-data and
    /// yields `None`; a full page yields the encoded follow-up window.
    pub fn next_token(&self, result_count: usize) -> Option<String> {
        if result_count >= self.limit as usize {
            Some(encode(&self.advance()))
        } else {
            None
        }
    }
}

/// Encode a window into an opaque token.
///
/// Deterministic: the same window always yields the same token, and
/// distinct windows never collide (the payload is injective).
pub fn encode(state: &CursorState) -> String {
    let payload = format!("{}:{}:{}", VERSION, state.limit, state.offset);
    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

/// Decode a token back into the exact window it was encoded from.
pub fn decode(token: &str) -> Result<CursorState> {
    let invalid = || Error::InvalidCursor(token.to_string());

    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
    let payload = String::from_utf8(bytes).map_err(|_| invalid())?;

    let mut parts = payload.split(':');
    let version = parts.next().ok_or_else(invalid)?;
    if version != VERSION {
        return Err(invalid());
    }

    let limit: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;
    let offset: u64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;
    if parts.next().is_some() || limit == 0 {
        return Err(invalid());
    }

    Ok(CursorState { limit, offset })
}

/// Decode an optional token, treating absent or empty as the first page
/// with the caller-supplied default limit.
pub fn decode_or_default(token: Option<&str>, default_limit: u32) -> Result<CursorState> {
    match token {
        None => Ok(CursorState::first_page(default_limit)),
        Some(t) if t.is_empty() => Ok(CursorState::first_page(default_limit)),
        Some(t) => decode(t),
    }
}
