//! Short return code derivation.
//!
//! Stand-in for the election's return-code mapping: derives a fixed-width
//! decimal code from the recursive hash of the context and the N shares.
//! Deterministic, so every node derives the same code from the same shares.

use crate::domain::ShortCode;
use crate::error::ConfirmationResult;
use crate::ports::outbound::ReturnCodeExtractor;
use shared_crypto::{recursive_hash, Hashable, ToHashable};
use shared_types::{ContextIds, GroupElement, NODE_COUNT};

/// Digits in a vote cast return code.
pub const SHORT_CODE_DIGITS: u32 = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct HashingReturnCodeExtractor;

impl ReturnCodeExtractor for HashingReturnCodeExtractor {
    fn extract_short_code(
        &self,
        context_ids: &ContextIds,
        shares: &[GroupElement; NODE_COUNT],
    ) -> ConfirmationResult<ShortCode> {
        let digest = recursive_hash(&Hashable::List(vec![
            context_ids.to_hashable(),
            shares.as_slice().to_hashable(),
        ]));
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let code = u64::from_be_bytes(prefix) % 10u64.pow(SHORT_CODE_DIGITS);
        Ok(ShortCode::new(format!(
            "{:0width$}",
            code,
            width = SHORT_CODE_DIGITS as usize
        )))
    }
}
