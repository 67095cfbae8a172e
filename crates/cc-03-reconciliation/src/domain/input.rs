//! Validated reconciliation input.

use crate::error::{ReconciliationError, ReconciliationResult};
use shared_types::{CommitmentHash, ContextIds, NodeId, ResolvedConfirmedVote};
use std::collections::{HashMap, HashSet};

/// The resolved votes a node must bring its local state in line with.
///
/// Only constructible through [`UpdateConfirmedVotingCardsInput::new`], so
/// an engine never sees a malformed allow-list entry, a duplicate card or
/// a vote with the wrong number of shares.
#[derive(Clone, Debug)]
pub struct UpdateConfirmedVotingCardsInput {
    local_node_id: NodeId,
    election_event_id: String,
    allow_lists: HashMap<String, HashSet<CommitmentHash>>,
    resolved: Vec<ResolvedConfirmedVote>,
}

impl UpdateConfirmedVotingCardsInput {
    /// Validate and build the input.
    ///
    /// `allow_lists` maps a verification card set id to its published long
    /// vote cast return code allow list. An empty `resolved` list is valid.
    pub fn new(
        local_node_id: u8,
        election_event_id: impl Into<String>,
        allow_lists: HashMap<String, Vec<String>>,
        resolved: Vec<ResolvedConfirmedVote>,
    ) -> ReconciliationResult<Self> {
        let local_node_id = NodeId::new(local_node_id)?;
        let election_event_id = election_event_id.into();

        if allow_lists.is_empty() {
            return Err(ReconciliationError::EmptyAllowLists);
        }
        let allow_lists = allow_lists
            .into_iter()
            .map(|(vcs_id, entries)| -> ReconciliationResult<(String, HashSet<CommitmentHash>)> {
                let parsed = entries
                    .iter()
                    .map(|entry| CommitmentHash::parse(entry))
                    .collect::<Result<HashSet<_>, _>>()?;
                Ok((vcs_id, parsed))
            })
            .collect::<ReconciliationResult<HashMap<_, _>>>()?;

        let mut seen = HashSet::with_capacity(resolved.len());
        for vote in &resolved {
            ContextIds::new(
                election_event_id.as_str(),
                vote.verification_card_set_id.as_str(),
                vote.verification_card_id.as_str(),
            )?;
            if !seen.insert(vote.verification_card_id.as_str()) {
                return Err(ReconciliationError::DuplicateResolution {
                    verification_card_id: vote.verification_card_id.clone(),
                });
            }
        }

        Ok(Self {
            local_node_id,
            election_event_id,
            allow_lists,
            resolved,
        })
    }

    pub fn local_node_id(&self) -> NodeId {
        self.local_node_id
    }

    pub fn election_event_id(&self) -> &str {
        &self.election_event_id
    }

    pub fn resolved(&self) -> &[ResolvedConfirmedVote] {
        &self.resolved
    }

    /// Whether `hash` is allowed for cards of `verification_card_set_id`.
    pub fn is_allowed(&self, verification_card_set_id: &str, hash: &CommitmentHash) -> bool {
        self.allow_lists
            .get(verification_card_set_id)
            .is_some_and(|list| list.contains(hash))
    }
}
