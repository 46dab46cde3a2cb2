//! Hex quantity helpers for Ethereum JSON-RPC values.

/// Parse a `0x`-prefixed (or bare) hex quantity such as a block number.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Returns `true` for a 32-byte hash: `0x` followed by exactly 64 hex digits.
pub fn is_tx_hash(s: &str) -> bool {
    s.len() == 66 && s.starts_with("0x") && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
