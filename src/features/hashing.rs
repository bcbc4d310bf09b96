/// Computes the BLAKE3 hash of a cache key, hex encoded.
pub fn hash_key(key: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(key.as_bytes());

    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
