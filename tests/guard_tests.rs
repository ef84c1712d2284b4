use uuid::Uuid;
use waypoint::{
    guard::{Action, Resource, authorize},
    models::{Comment, Journal, Reaction, User},
};

// --- Fixtures ---

fn user(id: u128) -> User {
    User {
        id: Uuid::from_u128(id),
        email: format!("user{id}@example.com"),
        ..User::default()
    }
}

fn journal(owner: &User, is_public: bool) -> Journal {
    Journal {
        id: Uuid::new_v4(),
        user_id: owner.id,
        is_public,
        ..Journal::default()
    }
}

fn comment(author: &User, journal: &Journal) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        journal_id: journal.id,
        user_id: author.id,
        ..Comment::default()
    }
}

fn reaction(author: &User, journal: &Journal) -> Reaction {
    Reaction {
        id: Uuid::new_v4(),
        journal_id: journal.id,
        user_id: author.id,
        ..Reaction::default()
    }
}

// --- Journal Rules ---

#[test]
fn test_public_journal_readable_by_anyone() {
    let owner = user(1);
    let stranger = user(2);
    let entry = journal(&owner, true);

    assert!(authorize(&stranger, Resource::Journal(&entry), Action::Read).is_ok());
}

#[test]
fn test_private_journal_readable_only_by_owner() {
    let owner = user(1);
    let stranger = user(2);
    let entry = journal(&owner, false);

    assert!(authorize(&owner, Resource::Journal(&entry), Action::Read).is_ok());
    assert!(authorize(&stranger, Resource::Journal(&entry), Action::Read).is_err());
}

#[test]
fn test_journal_mutation_is_owner_only() {
    let owner = user(1);
    let stranger = user(2);
    // Public visibility grants read, never write.
    let entry = journal(&owner, true);

    assert!(authorize(&owner, Resource::Journal(&entry), Action::Update).is_ok());
    assert!(authorize(&owner, Resource::Journal(&entry), Action::Delete).is_ok());
    assert!(authorize(&stranger, Resource::Journal(&entry), Action::Update).is_err());
    assert!(authorize(&stranger, Resource::Journal(&entry), Action::Delete).is_err());
}

// --- Comment Rules ---

#[test]
fn test_comment_create_follows_journal_visibility() {
    let owner = user(1);
    let stranger = user(2);
    let public_entry = journal(&owner, true);
    let private_entry = journal(&owner, false);
    let draft = Comment::default();

    let on = |j: &Journal, principal: &User| {
        authorize(
            principal,
            Resource::Comment {
                comment: &draft,
                journal: j,
            },
            Action::Create,
        )
    };

    assert!(on(&public_entry, &stranger).is_ok());
    assert!(on(&private_entry, &owner).is_ok());
    assert!(on(&private_entry, &stranger).is_err());
}

#[test]
fn test_comment_delete_author_or_journal_owner() {
    let journal_owner = user(1);
    let commenter = user(2);
    let third_party = user(3);
    let entry = journal(&journal_owner, true);
    let posted = comment(&commenter, &entry);

    let delete_as = |principal: &User| {
        authorize(
            principal,
            Resource::Comment {
                comment: &posted,
                journal: &entry,
            },
            Action::Delete,
        )
    };

    // Two independent paths: the comment's author, and the journal's owner.
    assert!(delete_as(&commenter).is_ok());
    assert!(delete_as(&journal_owner).is_ok());
    // Everyone else is denied, even though the journal is public.
    assert!(delete_as(&third_party).is_err());
}

// --- Reaction Rules ---

#[test]
fn test_reaction_create_follows_journal_visibility() {
    let owner = user(1);
    let stranger = user(2);
    let private_entry = journal(&owner, false);
    let draft = reaction(&stranger, &private_entry);

    let result = authorize(
        &stranger,
        Resource::Reaction {
            reaction: &draft,
            journal: &private_entry,
        },
        Action::Create,
    );
    assert!(result.is_err());
}

#[test]
fn test_reaction_delete_is_reactor_only() {
    let journal_owner = user(1);
    let reactor = user(2);
    let entry = journal(&journal_owner, true);
    let left = reaction(&reactor, &entry);

    let delete_as = |principal: &User| {
        authorize(
            principal,
            Resource::Reaction {
                reaction: &left,
                journal: &entry,
            },
            Action::Delete,
        )
    };

    assert!(delete_as(&reactor).is_ok());
    // Unlike comments, the journal owner cannot remove someone else's reaction.
    assert!(delete_as(&journal_owner).is_err());
}

// --- Default Denial ---

#[test]
fn test_unlisted_pairs_deny() {
    let owner = user(1);
    let entry = journal(&owner, true);
    let posted = comment(&owner, &entry);
    let left = reaction(&owner, &entry);

    // Pairs with no rule in the table must deny even for the owner.
    assert!(authorize(&owner, Resource::Journal(&entry), Action::Create).is_err());
    assert!(
        authorize(
            &owner,
            Resource::Comment {
                comment: &posted,
                journal: &entry,
            },
            Action::Update,
        )
        .is_err()
    );
    assert!(
        authorize(
            &owner,
            Resource::Reaction {
                reaction: &left,
                journal: &entry,
            },
            Action::Read,
        )
        .is_err()
    );
}
