//! Extraction consistency checks
//!
//! Three independent checks over exactly N node extractions:
//!
//! | Check | Question | Result |
//! |-------|----------|--------|
//! | election event | do all nodes hold the same election event? | `bool` |
//! | votes | does every node hold byte-identical encrypted votes? | `bool` |
//! | confirmations | which votes are provably confirmed? | resolved votes |
//!
//! All three fail with `SizeMismatch` on anything but N inputs; none of
//! them makes a best-effort guess from fewer nodes.

use super::extraction::{ExtractedElectionEvent, ExtractedVerificationCard};
use crate::error::{DisputeResolverError, DisputeResult};
use shared_crypto::{recursive_hash, AgreementHasher, ToHashable};
use shared_types::{
    ensure_node_count, into_node_array, CommitmentHash, ResolvedConfirmedVote, TypeError,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Stateless consistency checker over N node extractions.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractionConsistencyChecker;

impl ExtractionConsistencyChecker {
    pub fn new() -> Self {
        Self
    }

    /// True iff the recomputed context hash of every event is the same.
    pub fn check_election_event_consistency(
        &self,
        events: &[ExtractedElectionEvent],
    ) -> DisputeResult<bool> {
        ensure_node_count(events.len())?;

        let hashes: Vec<[u8; 32]> = events
            .iter()
            .map(|event| recursive_hash(&event.to_hashable()))
            .collect();
        let consistent = hashes.windows(2).all(|pair| pair[0] == pair[1]);

        if !consistent {
            warn!(
                "[cc-02] Election event {} differs between nodes",
                events[0].election_event_id
            );
        }
        Ok(consistent)
    }

    /// True iff every card id is reported by all N nodes with byte-identical
    /// encrypted votes. Fails closed on the first difference.
    pub fn check_vote_consistency(
        &self,
        card_lists: &[Vec<ExtractedVerificationCard>],
    ) -> DisputeResult<bool> {
        ensure_node_count(card_lists.len())?;

        let mut per_node: Vec<HashMap<&str, Vec<u8>>> = Vec::with_capacity(card_lists.len());
        for (index, cards) in card_lists.iter().enumerate() {
            let mut votes = HashMap::with_capacity(cards.len());
            for card in cards {
                let bytes = card
                    .encrypted_vote
                    .canonical_bytes()
                    .map_err(|e| DisputeResolverError::Encoding(e.to_string()))?;
                if let Some(previous) = votes.insert(card.verification_card_id.as_str(), bytes) {
                    if votes.get(card.verification_card_id.as_str()) != Some(&previous) {
                        warn!(
                            "[cc-02] Node list {} holds two different votes for card {}",
                            index + 1,
                            card.verification_card_id
                        );
                        return Ok(false);
                    }
                }
            }
            per_node.push(votes);
        }

        let all_ids: HashSet<&str> = per_node
            .iter()
            .flat_map(|votes| votes.keys().copied())
            .collect();

        for id in all_ids {
            let mut reported = per_node.iter().map(|votes| votes.get(id));
            let first = reported.next().flatten();
            let identical =
                first.is_some() && reported.all(|vote| vote.is_some() && vote == first);
            if !identical {
                warn!("[cc-02] Encrypted vote of card {} differs between nodes", id);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Resolve the confirmed votes that are provably agreed.
    ///
    /// A card qualifies when any node marks it confirmed and the agreement
    /// hash over its N hash shares is in the published long vote cast return
    /// code allow list of its card set. Identical duplicates collapse;
    /// conflicting ones are an integrity error. Output is sorted by card id.
    pub fn check_vote_confirmation_consistency(
        &self,
        context: &ExtractedElectionEvent,
        card_lists: &[Vec<ExtractedVerificationCard>],
    ) -> DisputeResult<Vec<ResolvedConfirmedVote>> {
        ensure_node_count(card_lists.len())?;

        for card in card_lists.iter().flatten() {
            if card.encrypted_vote.group != context.group {
                return Err(TypeError::ContextMismatch {
                    reason: format!(
                        "card {} is encrypted under a different group than election event {}",
                        card.verification_card_id, context.election_event_id
                    ),
                }
                .into());
            }
        }

        let allow_lists: HashMap<&str, HashSet<&CommitmentHash>> = context
            .verification_card_sets
            .iter()
            .map(|set| {
                (
                    set.verification_card_set_id.as_str(),
                    set.long_vote_cast_return_codes_allow_list.iter().collect(),
                )
            })
            .collect();

        let mut resolved: BTreeMap<String, ResolvedConfirmedVote> = BTreeMap::new();
        for card in card_lists.iter().flatten().filter(|card| card.is_confirmed) {
            let context_ids = card.context_ids(&context.election_event_id)?;
            let shares = into_node_array(card.hash_shares.clone())?;
            let commitment = AgreementHasher::agree_lvcc_hashes(&context_ids, &shares);

            let allowed = allow_lists
                .get(card.verification_card_set_id.as_str())
                .is_some_and(|list| list.contains(&commitment));
            if !allowed {
                debug!(
                    "[cc-02] Card {} marked confirmed but agreement hash not allowed",
                    card.verification_card_id
                );
                continue;
            }

            let vote = ResolvedConfirmedVote::new(
                card.verification_card_id.as_str(),
                card.verification_card_set_id.as_str(),
                card.hash_shares.clone(),
            )?;
            match resolved.get(&card.verification_card_id) {
                Some(existing) if existing != &vote => {
                    return Err(DisputeResolverError::DuplicateResolution {
                        verification_card_id: card.verification_card_id.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    resolved.insert(card.verification_card_id.clone(), vote);
                }
            }
        }

        Ok(resolved.into_values().collect())
    }
}
