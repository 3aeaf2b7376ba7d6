//! Recipe access policy.
//!
//! Decides, for a single recipe lookup, whether the requesting user may view or modify it.
//! Listing rules (public feed, search, by-author, dashboard) are filters and live in the
//! repository queries instead.
//!
//! Denials are quiet: a private recipe looks missing to anyone but its owner,
//! and a non-owner trying to edit, update or delete is sent back to the public listing
//! without learning whether the recipe exists.

use crate::models::Recipe;
use uuid::Uuid;

/// The per-record operations the policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    Edit,
    Update,
    Delete,
}

/// Outcome of evaluating an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Permit,
    /// Render the not-found page.
    NotFound,
    /// Redirect to the public recipe list, no mutation.
    Deny,
}

/// evaluate
///
/// `recipe` is the result of the lookup by id (`None` if it does not exist). Ownership is
/// always the comparison of `recipe.user_id` with the requester's id.
pub fn evaluate(recipe: Option<&Recipe>, requester: Uuid, operation: Operation) -> Verdict {
    let Some(recipe) = recipe else {
        return Verdict::NotFound;
    };

    let is_owner = recipe.is_owned_by(requester);
    match operation {
        Operation::View if is_owner || recipe.is_public() => Verdict::Permit,
        Operation::View => Verdict::NotFound,
        Operation::Edit | Operation::Update | Operation::Delete if is_owner => Verdict::Permit,
        Operation::Edit | Operation::Update | Operation::Delete => Verdict::Deny,
    }
}
