//! Request signing for the Afdian open API.
//!
//! The server recomputes `md5(token + "params" + params + "ts" + ts +
//! "user_id" + user_id)` over the exact `params` string it receives, so the
//! string we sign must be the string we send.

use md5::{Digest, Md5};
use serde::Serialize;

use crate::models::Credentials;

/// Paging parameters. Field order here is the canonical key order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageParams {
    pub page: u32,
    pub per_page: u32,
}

/// POST body accepted by every open API endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedRequest {
    pub user_id: String,
    pub params: String,
    pub ts: i64,
    pub sign: String,
}

impl SignedRequest {
    /// Serialize `params`, sign them at `ts`, and assemble the body.
    pub fn new<P: Serialize>(params: &P, ts: i64, credentials: &Credentials) -> serde_json::Result<Self> {
        let params = canonical_params(params)?;
        let sign = sign(&params, ts, credentials);

        Ok(Self {
            user_id: credentials.user_id.clone(),
            params,
            ts,
            sign,
        })
    }
}

/// Compact JSON with no whitespace, keys in declaration order.
pub fn canonical_params<P: Serialize>(params: &P) -> serde_json::Result<String> {
    serde_json::to_string(params)
}

/// Lowercase hex MD5 signature over already-serialized params.
pub fn sign(params_json: &str, ts: i64, credentials: &Credentials) -> String {
    let mut hasher = Md5::new();
    hasher.update(credentials.token.as_bytes());
    hasher.update(b"params");
    hasher.update(params_json.as_bytes());
    hasher.update(b"ts");
    hasher.update(ts.to_string().as_bytes());
    hasher.update(b"user_id");
    hasher.update(credentials.user_id.as_bytes());
    hex::encode(hasher.finalize())
}
