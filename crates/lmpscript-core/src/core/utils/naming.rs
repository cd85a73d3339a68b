use phf::{Map, phf_map};
use sha2::{Digest, Sha256};

const DIGEST_LENGTH: usize = 12;
const DEFAULT_PREFIX: &str = "grp";
const IDENTITY_SEPARATOR: &str = " ";

static OPERATOR_PREFIXES: Map<&'static str, &'static str> = phf_map! {
    "+" => "add",
    "-" => "sub",
    "*" => "mul",
};

/// Returns the short semantic prefix used for names generated for `operator`.
///
/// Algebraic symbols map to `add`, `sub` and `mul`; every other operator falls back to `grp`.
pub fn prefix_for(operator: &str) -> &'static str {
    OPERATOR_PREFIXES
        .get(operator)
        .copied()
        .unwrap_or(DEFAULT_PREFIX)
}

/// Joins operand identities into the single string that is hashed by [`hash_name`].
pub fn join_identities<'a>(identities: impl IntoIterator<Item = &'a str>) -> String {
    identities
        .into_iter()
        .collect::<Vec<_>>()
        .join(IDENTITY_SEPARATOR)
}

/// Produces a deterministic, identifier-safe name for an operator applied to operands.
///
/// The name is `<prefix>_<digest>`, where the digest is the first twelve hex characters of
/// the SHA-256 hash of the operator symbol and the operand identity string. Identical
/// inputs always produce identical names, which makes re-building the same expression
/// idempotent.
///
/// # Arguments
///
/// * `operator` - The operator symbol or tag (e.g. `+`, `union`).
/// * `operand_identity` - The operand identities joined by [`join_identities`].
/// * `prefix` - The semantic prefix, usually obtained from [`prefix_for`].
pub fn hash_name(operator: &str, operand_identity: &str, prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operator.as_bytes());
    hasher.update([0u8]);
    hasher.update(operand_identity.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", prefix, &digest[..DIGEST_LENGTH])
}
