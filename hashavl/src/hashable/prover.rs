//! Inclusion proofs and their verification.

use bincode::{Decode, Encode};

use crate::{
    error::{Error, Result},
    hashable::{
        HashableNode,
        hash::{Blake3Hasher, NodeHasher, node_hash_input},
    },
    node::Node,
};

/// One element of an inclusion proof: the hashed fields of a node plus
/// its stated hash.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ProofNode {
    /// The node key.
    pub key: Vec<u8>,
    /// The node height.
    pub height: i16,
    /// The payload digest, when the node carries one.
    pub value_hash: Option<Vec<u8>>,
    /// The left child's hash, when a left child exists.
    pub left_hash: Option<Vec<u8>>,
    /// The right child's hash, when a right child exists.
    pub right_hash: Option<Vec<u8>>,
    /// The stated node hash.
    pub hash: Vec<u8>,
}

/// An inclusion proof: the target node plus every ancestor up to the
/// root, ordered by ascending height (root last).
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Proof {
    /// The node whose inclusion is proven.
    pub node: ProofNode,
    /// The ancestors, leaf-most first, root last. Empty when the node is
    /// itself the root.
    pub parents: Vec<ProofNode>,
}

impl Proof {
    /// Serialize the proof for the wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::InvalidProof(format!("failed to encode proof: {e}")))
    }

    /// Deserialize a proof from the wire.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (proof, read) = bincode::decode_from_slice(data, bincode::config::standard())
            .map_err(|e| Error::InvalidProof(format!("failed to decode proof: {e}")))?;
        if read != data.len() {
            return Err(Error::InvalidProof(format!(
                "proof has {} trailing byte(s)",
                data.len() - read
            )));
        }
        Ok(proof)
    }
}

/// Builds and verifies inclusion proofs with an injected hash function.
#[derive(Debug, Clone, Default)]
pub struct Prover<H = Blake3Hasher> {
    hasher: H,
}

impl Prover<Blake3Hasher> {
    /// A prover over the provided Blake3 hasher.
    pub fn blake3() -> Self {
        Self::new(Blake3Hasher)
    }
}

impl<H: NodeHasher> Prover<H> {
    /// Create a prover over `hasher`.
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// The canonical node hash, computed from the node's current fields.
    pub fn generate_node_hash<N: HashableNode>(&self, node: &N) -> Vec<u8> {
        self.hasher.digest(&node_hash_input(
            &node.key(),
            node.height(),
            node.value_hash().as_deref(),
            node.left_hash().as_deref(),
            node.right_hash().as_deref(),
        ))
    }

    /// Build an inclusion proof for `node` given its ancestor chain, as
    /// returned by
    /// [`Tree::get_with_parents`](crate::tree::Tree::get_with_parents).
    ///
    /// Every node must carry a computed hash; computing the tree's root
    /// hash beforehand guarantees that.
    pub fn proof<N: HashableNode>(&self, node: &N, parents: &[N]) -> Result<Proof> {
        let mut sorted: Vec<&N> = parents.iter().collect();
        sorted.sort_by_key(|n| n.height());

        Ok(Proof {
            node: proof_node(node)?,
            parents: sorted
                .into_iter()
                .map(proof_node)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Verify `proof` against an externally known root hash.
    ///
    /// Checks that the target's stated hash matches its fields, that the
    /// top element's hash equals `root_hash`, and that every adjacent
    /// pair links through the parent's child hashes with a matching
    /// recomputed parent hash.
    pub fn prove(&self, proof: &Proof, root_hash: &[u8]) -> Result<()> {
        self.check_entry(&proof.node)?;

        let top_hash = proof
            .parents
            .last()
            .map_or(&proof.node.hash, |parent| &parent.hash);
        if top_hash.as_slice() != root_hash {
            return Err(Error::InvalidProof(format!(
                "top hash does not match the root hash: top={} root={}",
                hex::encode(top_hash),
                hex::encode(root_hash),
            )));
        }

        let mut leaf = &proof.node;
        for parent in &proof.parents {
            let leaf_hash = leaf.hash.as_slice();
            let linked = parent.left_hash.as_deref() == Some(leaf_hash)
                || parent.right_hash.as_deref() == Some(leaf_hash);
            if !linked {
                return Err(Error::InvalidProof(format!(
                    "node {} is not a child of its stated parent {}",
                    hex::encode(&leaf.key),
                    hex::encode(&parent.key),
                )));
            }

            self.check_entry(parent)?;
            leaf = parent;
        }

        Ok(())
    }

    fn check_entry(&self, entry: &ProofNode) -> Result<()> {
        let computed = self.hasher.digest(&node_hash_input(
            &entry.key,
            entry.height,
            entry.value_hash.as_deref(),
            entry.left_hash.as_deref(),
            entry.right_hash.as_deref(),
        ));

        if computed != entry.hash {
            return Err(Error::InvalidProof(format!(
                "hash of node {} does not match its fields: stated={} computed={}",
                hex::encode(&entry.key),
                hex::encode(&entry.hash),
                hex::encode(&computed),
            )));
        }

        Ok(())
    }
}

fn proof_node<N: HashableNode>(node: &N) -> Result<ProofNode> {
    let hash = node.hash().ok_or_else(|| {
        Error::InvalidProof(format!(
            "node {} has no computed hash; compute the root hash first",
            hex::encode(node.key()),
        ))
    })?;

    Ok(ProofNode {
        key: node.key(),
        height: node.height(),
        value_hash: node.value_hash(),
        left_hash: node.left_hash(),
        right_hash: node.right_hash(),
        hash,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::hashable::{HashableMutableNode, node::HashNode};
    use crate::node::MutableNode;

    fn prover() -> Prover<Blake3Hasher> {
        Prover::new(Blake3Hasher)
    }

    fn sealed(key: &[u8]) -> HashNode {
        let node = HashNode::with_value_hash(key, &[0x11; 32]);
        let hash = prover().generate_node_hash(&node);
        node.set_hash(hash).expect("set_hash");
        node
    }

    #[test]
    fn a_root_only_proof_verifies_against_its_own_hash() {
        let node = sealed(b"100");
        let proof = prover().proof(&node, &[]).expect("proof");
        prover()
            .prove(&proof, &node.hash().expect("hash"))
            .expect("prove");
    }

    #[test]
    fn a_root_only_proof_rejects_a_foreign_root_hash() {
        let node = sealed(b"100");
        let proof = prover().proof(&node, &[]).expect("proof");
        assert_matches!(
            prover().prove(&proof, &[0u8; 32]),
            Err(Error::InvalidProof(_))
        );
    }

    #[test]
    fn proof_requires_computed_hashes() {
        let node = HashNode::new(b"100");
        assert_matches!(
            prover().proof(&node, &[]),
            Err(Error::InvalidProof(_))
        );
    }

    #[test]
    fn parents_are_ordered_by_ascending_height() {
        let node = sealed(b"030");

        let mid = HashNode::new(b"050");
        mid.set_height(1).expect("height");
        mid.set_left_hash(Some(node.hash().expect("hash")))
            .expect("left_hash");
        let mid_hash = prover().generate_node_hash(&mid);
        mid.set_hash(mid_hash).expect("set_hash");

        let root = HashNode::new(b"100");
        root.set_height(2).expect("height");
        root.set_left_hash(Some(mid.hash().expect("hash")))
            .expect("left_hash");
        let root_hash = prover().generate_node_hash(&root);
        root.set_hash(root_hash.clone()).expect("set_hash");

        // parents arrive root-first, as get_with_parents returns them
        let proof = prover()
            .proof(&node, &[root.clone(), mid.clone()])
            .expect("proof");
        let heights: Vec<i16> = proof.parents.iter().map(|p| p.height).collect();
        assert_eq!(heights, vec![1, 2]);

        prover().prove(&proof, &root_hash).expect("prove");
    }

    #[test]
    fn wire_round_trip() {
        let node = sealed(b"100");
        let proof = prover().proof(&node, &[]).expect("proof");

        let bytes = proof.encode().expect("encode");
        let decoded = Proof::decode(&bytes).expect("decode");
        assert_eq!(decoded, proof);

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert_matches!(Proof::decode(&trailing), Err(Error::InvalidProof(_)));
    }
}
