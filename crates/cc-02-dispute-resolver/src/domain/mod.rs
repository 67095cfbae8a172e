//! Domain layer for the dispute resolver

pub mod consistency;
pub mod extraction;

pub use consistency::ExtractionConsistencyChecker;
pub use extraction::{
    ElGamalCiphertext, EncryptedVote, ExtractedElectionEvent, ExtractedVerificationCard,
    ExtractedVerificationCardSet, NodeExtraction, ZkProof,
};
