//! Opaque paging tokens: URL-safe base64 of a versioned rank cursor.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{LibraryError, LibraryResult};

const TOKEN_VERSION: &str = "r1";

/// Token that resumes strictly after the entry with `rank`.
pub fn encode_token(rank: u64) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}:{}", TOKEN_VERSION, rank))
}

pub fn decode_token(token: &str) -> LibraryResult<u64> {
    let bad = |why: &str| LibraryError::invalid("invalid_paging_token".to_string(), format!("paging token '{}' {}", token, why));
    let bytes = URL_SAFE_NO_PAD.decode(token.trim()).map_err(|_| bad("is not base64"))?;
    let text = String::from_utf8(bytes).map_err(|_| bad("is not utf-8"))?;
    let Some((version, rank)) = text.split_once(':') else { return Err(bad("has no cursor")); };
    if version != TOKEN_VERSION { return Err(bad("has an unknown version")); }
    rank.parse::<u64>().map_err(|_| bad("has a non-numeric cursor"))
}

#[cfg(test)]
#[path = "paging_tests.rs"]
mod paging_tests;
