//! # Test Fixtures
//!
//! A simulated group of four control components answering the fan-in bus,
//! plus the election data every flow shares.
//!
//! Each simulated node keeps its own record of the cards it saw cast and
//! confirmed, so the dispute flow can export per-node extractions and
//! reconcile per-node state from the same run.

use cc_01_vote_confirmation::adapters::{
    ChannelBroadcaster, FanInBus, HashingReturnCodeExtractor, InMemoryAllowListStore,
    InMemoryBallotBoxRepository, InMemoryConfirmationStateStore, InMemoryIdempotencyStore,
    NodeRequest,
};
use cc_01_vote_confirmation::domain::{BallotBox, ConfirmationKey, HashShare, ValueShare};
use cc_01_vote_confirmation::ports::outbound::{HashShareRequest, TimeSource, ValueShareRequest};
use cc_01_vote_confirmation::{
    ConfirmationConfig, ConfirmationRequest, VoteConfirmationDependencies, VoteConfirmationService,
};
use cc_02_dispute_resolver::domain::{
    ElGamalCiphertext, EncryptedVote, ExtractedElectionEvent, ExtractedVerificationCard,
    ExtractedVerificationCardSet, NodeExtraction, ZkProof,
};
use cc_03_reconciliation::adapters::InMemoryLocalConfirmationStore;
use cc_03_reconciliation::LocalCardStatus;
use parking_lot::Mutex;
use primitive_types::U256;
use shared_crypto::{
    base64_encode, recursive_hash, AgreementHasher, Ed25519KeyPair, Ed25519SignatureService,
    Hashable, PayloadSignature, SignatureService, ToHashable,
};
use shared_types::{CommitmentHash, ContextIds, GqGroup, GroupElement, NodeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

pub const ELECTION_EVENT_ID: &str = "0b88257ec32142bb8ee0ed1bb70f362e";
pub const VERIFICATION_CARD_SET_ID: &str = "6b1a1f3d3e4a4c1a9a0e2c3e4f5a6b7c";
pub const CARD_A: &str = "a4b1cbd3d6f64d8e9e1f2a3b4c5d6e7f";
pub const CARD_B: &str = "b4b1cbd3d6f64d8e9e1f2a3b4c5d6e7f";
pub const CARD_C: &str = "c4b1cbd3d6f64d8e9e1f2a3b4c5d6e7f";

/// Voting window used by every flow.
pub const VOTING_START: u64 = 1_700_000_000;
pub const VOTING_FINISH: u64 = VOTING_START + 86_400;

/// Small safe-prime group: p = 23, q = 11, g = 2.
pub fn group() -> GqGroup {
    GqGroup::new(U256::from(23u64), U256::from(11u64), U256::from(2u64))
}

pub fn element(value: u64) -> GroupElement {
    GroupElement::new(U256::from(value), &group()).expect("fixture value is a group member")
}

pub fn context_ids(verification_card_id: &str) -> ContextIds {
    ContextIds::new(ELECTION_EVENT_ID, VERIFICATION_CARD_SET_ID, verification_card_id)
        .expect("fixture ids are UUIDs")
}

/// The confirmation key a voter derives from the correct confirmation code.
pub fn confirmation_key(verification_card_id: &str) -> ConfirmationKey {
    ConfirmationKey::new(context_ids(verification_card_id), element(4))
}

/// A key derived from a mistyped confirmation code.
pub fn wrong_confirmation_key(verification_card_id: &str) -> ConfirmationKey {
    ConfirmationKey::new(context_ids(verification_card_id), element(9))
}

/// Deterministic encrypted vote; identical on every node for a given card.
pub fn encrypted_vote(verification_card_id: &str) -> EncryptedVote {
    let seed = u64::from(verification_card_id.as_bytes()[0]);
    let ciphertext = |offset: u64| ElGamalCiphertext {
        gamma: U256::from(seed + offset),
        phis: vec![U256::from(seed + offset + 1), U256::from(seed + offset + 2)],
    };
    EncryptedVote {
        group: group(),
        ciphertext: ciphertext(0),
        exponentiated_ciphertext: ciphertext(10),
        encrypted_partial_choice_return_codes: ciphertext(20),
        exponentiation_proof: ZkProof {
            e: U256::from(seed + 30),
            z: vec![U256::from(seed + 31)],
        },
        plaintext_equality_proof: ZkProof {
            e: U256::from(seed + 40),
            z: vec![U256::from(seed + 41), U256::from(seed + 42)],
        },
    }
}

/// Group members each node reveals as its value share.
const NODE_SHARE_VALUES: [u64; 4] = [2, 3, 6, 8];

/// What one node knows about one card.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeRecord {
    pub cast: bool,
    pub confirmed: bool,
}

/// One simulated control component.
pub struct SimulatedNode {
    node_id: NodeId,
    signer: Ed25519SignatureService,
    records: Mutex<HashMap<String, NodeRecord>>,
    silent: AtomicBool,
    drop_confirmations: AtomicBool,
}

impl SimulatedNode {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            signer: Ed25519SignatureService::new(node_id.signing_alias(), Ed25519KeyPair::generate()),
            records: Mutex::new(HashMap::new()),
            silent: AtomicBool::new(false),
            drop_confirmations: AtomicBool::new(false),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn signer(&self) -> &Ed25519SignatureService {
        &self.signer
    }

    /// Stop answering any request.
    pub fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::SeqCst);
    }

    /// Answer value requests but lose the local confirmation record,
    /// as a node that crashes right after answering would.
    pub fn set_drop_confirmations(&self, drop: bool) {
        self.drop_confirmations.store(drop, Ordering::SeqCst);
    }

    pub fn record_cast(&self, verification_card_id: &str) {
        self.records
            .lock()
            .entry(verification_card_id.to_string())
            .or_default()
            .cast = true;
    }

    pub fn forget(&self, verification_card_id: &str) {
        self.records.lock().remove(verification_card_id);
    }

    pub fn record(&self, verification_card_id: &str) -> NodeRecord {
        self.records
            .lock()
            .get(verification_card_id)
            .cloned()
            .unwrap_or_default()
    }

    /// This node's hashed long vote cast return code share for `key`.
    pub fn hash_value(&self, key: &ConfirmationKey) -> String {
        let digest = recursive_hash(&Hashable::List(vec![
            Hashable::text("lVCC"),
            u64::from(self.node_id.get()).to_hashable(),
            key.to_hashable(),
        ]));
        base64_encode(&digest)
    }

    pub fn answer_hash_request(&self, request: &HashShareRequest) -> HashShare {
        let mut share = HashShare {
            node_id: self.node_id,
            context_ids: request.context_ids.clone(),
            confirmation_attempt_id: request.confirmation_attempt_id,
            hash_value: self.hash_value(&request.confirmation_key),
            signature: PayloadSignature::from_bytes([0u8; 64]),
        };
        share.signature = self.signer.sign(
            &share.signed_payload(),
            &HashShare::signing_context(&share.context_ids, self.node_id),
        );
        share
    }

    pub fn answer_value_request(&self, request: &ValueShareRequest) -> ValueShare {
        let vc = request.context_ids.verification_card_id.as_str();
        let verified = self.record(vc).cast;
        if verified && !self.drop_confirmations.load(Ordering::SeqCst) {
            if let Some(record) = self.records.lock().get_mut(vc) {
                record.confirmed = true;
            }
        }

        let mut share = ValueShare {
            context_ids: request.context_ids.clone(),
            node_id: self.node_id,
            group: group(),
            confirmation_key: request.confirmation_key.clone(),
            is_verified: verified,
            actual_share: verified.then(|| element(NODE_SHARE_VALUES[usize::from(self.node_id.get()) - 1])),
            signature: PayloadSignature::from_bytes([0u8; 64]),
        };
        share.signature = self.signer.sign(
            &share.signed_payload(),
            &ValueShare::signing_context(&share.context_ids, self.node_id),
        );
        share
    }

    /// Local confirmation store built from this node's records.
    pub fn local_store(&self) -> InMemoryLocalConfirmationStore {
        let store = InMemoryLocalConfirmationStore::new();
        for (vc, record) in self.records.lock().iter() {
            let status = match record {
                NodeRecord { confirmed: true, .. } => LocalCardStatus::Confirmed,
                NodeRecord { cast: true, .. } => LocalCardStatus::Sent,
                _ => LocalCardStatus::NotSent,
            };
            store.set_status(ELECTION_EVENT_ID, vc, status);
        }
        store
    }
}

/// Four simulated nodes behind one fan-in bus.
pub struct SimulatedNetwork {
    nodes: Vec<SimulatedNode>,
    relay: Ed25519SignatureService,
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self {
            nodes: NodeId::all().into_iter().map(SimulatedNode::new).collect(),
            relay: Ed25519SignatureService::new(
                cc_01_vote_confirmation::domain::VOTE_VERIFICATION_ALIAS,
                Ed25519KeyPair::generate(),
            ),
        }
    }

    pub fn nodes(&self) -> &[SimulatedNode] {
        &self.nodes
    }

    pub fn node(&self, node: u8) -> &SimulatedNode {
        &self.nodes[usize::from(node) - 1]
    }

    pub fn relay(&self) -> &Ed25519SignatureService {
        &self.relay
    }

    /// Signature service of the voting server: trusts every node and the relay.
    pub fn verifier(&self) -> Ed25519SignatureService {
        let mut verifier = Ed25519SignatureService::new("voting_server", Ed25519KeyPair::generate());
        for node in &self.nodes {
            verifier.trust(node.signer().own_alias(), node.signer().public_key());
        }
        verifier.trust(self.relay.own_alias(), self.relay.public_key());
        verifier
    }

    /// Every node records the card as cast.
    pub fn cast(&self, verification_card_id: &str) {
        for node in &self.nodes {
            node.record_cast(verification_card_id);
        }
    }

    /// Hash shares of all nodes for `key`, in node order.
    pub fn hash_values(&self, key: &ConfirmationKey) -> Vec<String> {
        self.nodes.iter().map(|node| node.hash_value(key)).collect()
    }

    /// Allow-list entry produced by the correct confirmation key of a card.
    pub fn expected_commitment(&self, verification_card_id: &str) -> CommitmentHash {
        let key = confirmation_key(verification_card_id);
        let values: [String; 4] = NodeId::all().map(|id| self.node(id.get()).hash_value(&key));
        AgreementHasher::agree_lvcc_hashes(&context_ids(verification_card_id), &values)
    }

    /// Drain broadcast requests and answer them from every non-silent node.
    ///
    /// Each answer is delivered twice under the same message id, as an
    /// at-least-once transport would.
    pub fn spawn(
        self: &Arc<Self>,
        bus: Arc<FanInBus>,
        mut requests: UnboundedReceiver<(Uuid, NodeRequest)>,
    ) -> JoinHandle<()> {
        let network = Arc::clone(self);
        tokio::spawn(async move {
            while let Some((correlation_id, request)) = requests.recv().await {
                network.answer(&bus, correlation_id, &request);
            }
        })
    }

    fn answer(&self, bus: &FanInBus, correlation_id: Uuid, request: &NodeRequest) {
        for node in self.nodes.iter().filter(|n| !n.silent.load(Ordering::SeqCst)) {
            let message_id = Uuid::new_v4();
            for _ in 0..2 {
                let outcome = match request {
                    NodeRequest::HashShares(r) => {
                        bus.deliver_hash_share(message_id, correlation_id, node.answer_hash_request(r))
                    }
                    NodeRequest::ValueShares(r) => bus.deliver_value_share(
                        message_id,
                        correlation_id,
                        node.answer_value_request(r),
                    ),
                };
                debug!("[tests] node {} delivery: {:?}", node.node_id(), outcome);
            }
        }
    }

    /// Election event as exported by every node, with the allow list
    /// holding the expected commitments of `cards`.
    pub fn election_event(&self, cards: &[&str]) -> ExtractedElectionEvent {
        ExtractedElectionEvent {
            election_event_id: ELECTION_EVENT_ID.to_string(),
            group: group(),
            hash_election_event_context: "election-event-context".to_string(),
            verification_card_sets: vec![ExtractedVerificationCardSet {
                verification_card_set_id: VERIFICATION_CARD_SET_ID.to_string(),
                hash_context: "verification-card-set-context".to_string(),
                partial_choice_return_codes_allow_list: vec!["pcc-allow".to_string()],
                long_vote_cast_return_codes_allow_list: cards
                    .iter()
                    .map(|vc| self.expected_commitment(vc))
                    .collect(),
            }],
        }
    }

    /// Per-node exports after the election.
    pub fn extractions(&self, allowed_cards: &[&str], cards: &[&str]) -> Vec<NodeExtraction> {
        let event = self.election_event(allowed_cards);
        self.nodes
            .iter()
            .map(|node| NodeExtraction {
                node_id: node.node_id(),
                election_event: event.clone(),
                verification_cards: cards
                    .iter()
                    .filter(|vc| node.record(vc).cast)
                    .map(|vc| ExtractedVerificationCard {
                        verification_card_id: vc.to_string(),
                        verification_card_set_id: VERIFICATION_CARD_SET_ID.to_string(),
                        encrypted_vote: encrypted_vote(vc),
                        hash_shares: self.hash_values(&confirmation_key(vc)),
                        is_confirmed: node.record(vc).confirmed,
                    })
                    .collect(),
            })
            .collect()
    }
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed clock inside the voting window.
pub struct FixedTime(pub u64);

impl TimeSource for FixedTime {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Round timeout short enough for tests that wait on a silent node.
pub const TEST_ROUND_TIMEOUT: Duration = Duration::from_millis(200);

/// Vote confirmation service wired to a simulated network over the
/// fan-in bus.
pub struct ConfirmationHarness {
    pub network: Arc<SimulatedNetwork>,
    pub bus: Arc<FanInBus>,
    pub card_states: Arc<InMemoryConfirmationStateStore>,
    pub service: VoteConfirmationService,
    node_task: JoinHandle<()>,
}

impl ConfirmationHarness {
    /// Start a harness where `cards` were cast and are allow-listed.
    /// Must run inside a tokio runtime.
    pub fn start(cards: &[&str]) -> Self {
        let network = Arc::new(SimulatedNetwork::new());
        let (broadcaster, requests) = ChannelBroadcaster::new();
        let bus = Arc::new(FanInBus::new(Arc::new(broadcaster)).with_round_timeout(TEST_ROUND_TIMEOUT));
        let node_task = network.spawn(bus.clone(), requests);

        let allow_lists = Arc::new(InMemoryAllowListStore::new());
        allow_lists.publish(
            VERIFICATION_CARD_SET_ID,
            cards.iter().map(|vc| network.expected_commitment(vc)),
        );

        let ballot_boxes = Arc::new(InMemoryBallotBoxRepository::new());
        ballot_boxes.insert(
            ELECTION_EVENT_ID,
            VERIFICATION_CARD_SET_ID,
            BallotBox {
                ballot_box_id: "ballot-box-1".to_string(),
                group: group(),
                start_time: VOTING_START,
                finish_time: VOTING_FINISH,
                grace_period_secs: 900,
                mixed: false,
            },
        );

        let card_states = Arc::new(InMemoryConfirmationStateStore::new());
        for vc in cards {
            card_states.mark_sent(&context_ids(vc));
            network.cast(vc);
        }

        let service = VoteConfirmationService::new(VoteConfirmationDependencies {
            allow_lists,
            ballot_boxes,
            card_states: card_states.clone(),
            idempotency: Arc::new(InMemoryIdempotencyStore::new()),
            bus: bus.clone(),
            extractor: Arc::new(HashingReturnCodeExtractor),
            signatures: Arc::new(network.verifier()),
            config: ConfirmationConfig::default(),
        })
        .expect("default config is valid")
        .with_time_source(Box::new(FixedTime(VOTING_START + 3_600)));

        Self {
            network,
            bus,
            card_states,
            service,
            node_task,
        }
    }

    /// A relay-signed confirmation request.
    pub fn request(&self, key: ConfirmationKey, attempt: u8) -> ConfirmationRequest {
        let signature = self
            .network
            .relay()
            .sign(&key.to_hashable(), &key.signing_context());
        ConfirmationRequest {
            context_ids: key.context_ids.clone(),
            confirmation_key: key,
            confirmation_attempt_id: attempt,
            signature,
        }
    }
}

impl Drop for ConfirmationHarness {
    fn drop(&mut self) {
        self.node_task.abort();
    }
}
