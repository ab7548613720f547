use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{RelayError, RelayResult};

/// Network address of one backend completion server.
///
/// Holds the full URL requests are posted to, e.g.
/// `http://10.0.0.5:9999/v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Endpoint(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed set of backends handed out in round-robin order.
///
/// The cursor is a single counter shared by every request; `next` bumps it
/// once per call whatever happens to the request afterwards, so a failing
/// endpoint stays in the rotation.
#[derive(Debug)]
pub struct ServerPool {
    endpoints: Vec<Endpoint>,
    cursor: AtomicUsize,
}

impl ServerPool {
    pub fn new(endpoints: Vec<Endpoint>) -> RelayResult<Self> {
        if endpoints.is_empty() {
            return Err(RelayError::Internal(
                "server pool needs at least one endpoint".to_string(),
            ));
        }

        Ok(Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Return the endpoint under the cursor and advance it by one.
    pub fn next(&self) -> &Endpoint {
        let ticket = self.cursor.fetch_add(1, Ordering::Relaxed);
        &self.endpoints[ticket % self.endpoints.len()]
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}
