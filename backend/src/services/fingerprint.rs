//! Fingerprint of a normalized flight set.

use sha2::{Digest, Sha256};

use crate::models::FlightRecord;

/// SHA-256 over the serialized flights, hex encoded.
///
/// Input order matters; callers pass the deduplicated set, which is already in
/// canonical order.
pub fn flight_set_fingerprint(flights: &[FlightRecord]) -> String {
    let mut hasher = Sha256::new();
    for flight in flights {
        // Plain struct of strings and timestamps; serialization cannot fail
        let encoded = serde_json::to_vec(flight).unwrap_or_default();
        hasher.update(&encoded);
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
