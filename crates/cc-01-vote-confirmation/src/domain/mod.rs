//! Domain layer for vote confirmation

pub mod session;
pub mod shares;
pub mod window;

pub use session::{
    AgreementEvaluation, ConfirmationOutcome, ConfirmationSession, RejectionReason, RoundInput,
    RoundOutcome, SessionKey, SessionState, ValueShareEvaluation, MAX_CONFIRMATION_ATTEMPTS,
};
pub use shares::{
    ConfirmationKey, HashShare, ShortCode, ValueShare, CONFIRMATION_KEY_CONTEXT,
    HASH_SHARE_CONTEXT, VALUE_SHARE_CONTEXT, VOTE_VERIFICATION_ALIAS,
};
pub use window::{BallotBox, WindowViolation};
