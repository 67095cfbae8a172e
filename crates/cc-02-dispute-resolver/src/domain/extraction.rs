//! Per-node extraction snapshots.
//!
//! After the election every control component exports its own view of the
//! election event and of every ballot it processed. The dispute resolver
//! only ever compares these snapshots; it never trusts one over another.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_crypto::{Hashable, ToHashable};
use shared_types::{CommitmentHash, ContextIds, GqGroup, NodeId, NodeIndexed, TypeResult};

/// ElGamal ciphertext `(gamma, phi_1..phi_l)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElGamalCiphertext {
    pub gamma: U256,
    pub phis: Vec<U256>,
}

/// Non-interactive zero-knowledge proof `(e, z)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    pub e: U256,
    pub z: Vec<U256>,
}

/// A cast vote as stored by one node: ciphertexts and their proofs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVote {
    pub group: GqGroup,
    pub ciphertext: ElGamalCiphertext,
    pub exponentiated_ciphertext: ElGamalCiphertext,
    pub encrypted_partial_choice_return_codes: ElGamalCiphertext,
    pub exponentiation_proof: ZkProof,
    pub plaintext_equality_proof: ZkProof,
}

impl EncryptedVote {
    /// Canonical bytes used for cross-node identity checks.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

/// One node's snapshot of one ballot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedVerificationCard {
    pub verification_card_id: String,
    pub verification_card_set_id: String,
    pub encrypted_vote: EncryptedVote,
    /// Hashed long vote cast return code shares in node order
    pub hash_shares: Vec<String>,
    pub is_confirmed: bool,
}

impl ExtractedVerificationCard {
    pub fn context_ids(&self, election_event_id: &str) -> TypeResult<ContextIds> {
        ContextIds::new(
            election_event_id,
            self.verification_card_set_id.as_str(),
            self.verification_card_id.as_str(),
        )
    }
}

/// One node's snapshot of a verification card set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedVerificationCardSet {
    pub verification_card_set_id: String,
    pub hash_context: String,
    pub partial_choice_return_codes_allow_list: Vec<String>,
    pub long_vote_cast_return_codes_allow_list: Vec<CommitmentHash>,
}

/// One node's snapshot of the whole election event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedElectionEvent {
    pub election_event_id: String,
    pub group: GqGroup,
    pub hash_election_event_context: String,
    pub verification_card_sets: Vec<ExtractedVerificationCardSet>,
}

impl ExtractedElectionEvent {
    pub fn verification_card_set(&self, id: &str) -> Option<&ExtractedVerificationCardSet> {
        self.verification_card_sets
            .iter()
            .find(|set| set.verification_card_set_id == id)
    }
}

/// Everything one node exported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeExtraction {
    pub node_id: NodeId,
    pub election_event: ExtractedElectionEvent,
    pub verification_cards: Vec<ExtractedVerificationCard>,
}

impl NodeIndexed for NodeExtraction {
    fn node_id(&self) -> NodeId {
        self.node_id
    }
}

impl ToHashable for ExtractedVerificationCardSet {
    fn to_hashable(&self) -> Hashable {
        Hashable::List(vec![
            self.verification_card_set_id.to_hashable(),
            self.hash_context.to_hashable(),
            self.partial_choice_return_codes_allow_list.to_hashable(),
            Hashable::List(
                self.long_vote_cast_return_codes_allow_list
                    .iter()
                    .map(|hash| hash.as_str().to_hashable())
                    .collect(),
            ),
        ])
    }
}

/// Card sets are hashed in ascending id order, whatever order a node
/// exported them in.
impl ToHashable for ExtractedElectionEvent {
    fn to_hashable(&self) -> Hashable {
        let mut sets: Vec<&ExtractedVerificationCardSet> =
            self.verification_card_sets.iter().collect();
        sets.sort_by(|a, b| a.verification_card_set_id.cmp(&b.verification_card_set_id));

        Hashable::List(vec![
            self.election_event_id.to_hashable(),
            self.group.to_hashable(),
            self.hash_election_event_context.to_hashable(),
            Hashable::List(sets.into_iter().map(ToHashable::to_hashable).collect()),
        ])
    }
}
