// Token identifiers are UUIDv7: a 48-bit millisecond timestamp followed by
// random bits.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a token identifier (`jti`) as a hyphenated UUIDv7 string.
pub fn token_id() -> String {
    uuidv7().to_string()
}
