//! The authorization decision table.
//!
//! Every ownership and visibility rule in the application lives in this one
//! dispatch instead of being re-implemented inline at each call site. Handlers
//! load the resource, call [`authorize`], and only then act.

use crate::error::ApiError;
use crate::models::{Comment, Journal, Reaction, User};

/// Action
///
/// What the principal is attempting to do with the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

/// Resource
///
/// The target of an authorization check. Dependent resources carry their parent
/// journal so visibility rules can be applied without further lookups.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Journal(&'a Journal),
    Comment {
        comment: &'a Comment,
        journal: &'a Journal,
    },
    Reaction {
        reaction: &'a Reaction,
        journal: &'a Journal,
    },
}

/// authorize
///
/// Pure decision function: no side effects, no I/O. Returns `Ok(())` when the
/// principal may perform `action` on `resource`, `Forbidden` otherwise.
///
/// Rules:
/// - Journal read: public, or the principal owns it.
/// - Journal update/delete: owner only.
/// - Comment create / Reaction create: the parent journal must be readable
///   by the principal (the journal-read rule applied transitively).
/// - Comment delete: the comment's author OR the journal's owner — two
///   independent paths.
/// - Reaction delete: the user who created the reaction, nobody else.
///
/// Any (resource, action) pair not listed denies. New operations must be added
/// here explicitly rather than checked inline elsewhere.
///
/// `Forbidden` is distinct from `NotFound`; callers serving reads of private
/// resources collapse the two so that an unauthorized request cannot learn
/// whether the resource exists.
pub fn authorize(principal: &User, resource: Resource<'_>, action: Action) -> Result<(), ApiError> {
    let allowed = match (resource, action) {
        (Resource::Journal(journal), Action::Read) => journal_readable(principal, journal),
        (Resource::Journal(journal), Action::Update) | (Resource::Journal(journal), Action::Delete) => {
            journal.user_id == principal.id
        }

        (Resource::Comment { journal, .. }, Action::Create) => journal_readable(principal, journal),
        (Resource::Comment { comment, journal }, Action::Delete) => {
            comment.user_id == principal.id || journal.user_id == principal.id
        }

        (Resource::Reaction { journal, .. }, Action::Create) => journal_readable(principal, journal),
        (Resource::Reaction { reaction, .. }, Action::Delete) => reaction.user_id == principal.id,

        _ => false,
    };

    if allowed { Ok(()) } else { Err(ApiError::Forbidden) }
}

/// A journal is readable when it is public or the principal is its owner.
fn journal_readable(principal: &User, journal: &Journal) -> bool {
    journal.is_public || journal.user_id == principal.id
}
