use sha3::{Digest, Keccak256};

use crate::types::{Address, Node};

pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    Keccak256::digest(bytes).into()
}

/// Keccak-256 of a single label.
pub fn labelhash(label: &str) -> Node {
    keccak256(label.as_bytes())
}

/// ENS namehash: labels are folded from the right,
/// `node = keccak256(node || labelhash(label))`, starting from 32 zero bytes.
pub fn namehash(name: &str) -> Node {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut hasher = Keccak256::new();
        hasher.update(node);
        hasher.update(labelhash(label));
        node = hasher.finalize().into();
    }
    node
}

/// Node of `address` in the reverse registrar:
/// `namehash("<lowercase hex>.addr.reverse")`.
pub fn hash_address(address: &Address) -> Node {
    namehash(&format!("{}.addr.reverse", hex::encode(address.as_bytes())))
}
