//! Heuristic relevance classifier for public-infrastructure awards.

use crate::constants::{DESCRIPTION_TERMS, PUBLIC_RECIPIENT_TERMS};
use crate::types::AwardSummary;

/// Decide whether an award looks like public-infrastructure work: the
/// description mentions an infrastructure term, or the recipient reads like
/// a government or civic body. Pure and total; missing fields are treated
/// as empty strings.
pub fn is_public_interest(award: &AwardSummary) -> bool {
    let description = award.description.as_deref().unwrap_or("").to_lowercase();
    let recipient = award.recipient_name.as_deref().unwrap_or("").to_lowercase();

    let has_good_description = DESCRIPTION_TERMS
        .iter()
        .any(|term| description.contains(term));
    let is_public_recipient = PUBLIC_RECIPIENT_TERMS
        .iter()
        .any(|term| recipient.contains(term));

    has_good_description || is_public_recipient
}
