//! The list store: creating lists, ranking entries, and reordering.
//!
//! Every mutation is addressed by the list's private identifier and runs in
//! an IMMEDIATE transaction so the rank a writer computes cannot be taken by
//! another connection before it commits. The `(list, rank)` unique index is
//! the last line of defence; a collision there is retried.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use cinelist_catalog::{EntryWithMovie, ListSummary, MovieList, MovieRecord};
use cinelist_db::{Connection, NewList, operations, queries};
use rusqlite::{Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::access::{Access, resolve_identifier};
use crate::error::StoreError;
use crate::movies::{MovieRef, resolve_or_create_in};
use crate::ranks::{AfterLast, RankSource, rank_after};
use crate::tokens::{TokenGenerator, UuidTokens, generate_pair};

/// How many fresh identifier pairs to try before giving up.
pub const MAX_IDENTIFIER_ATTEMPTS: u32 = 5;

/// How many times an append may lose the race for a rank.
pub const MAX_RANK_ATTEMPTS: u32 = 5;

/// What to do when a reorder would put two entries on the same rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderPolicy {
    /// Fail the whole batch with `DuplicateRank`; nothing is applied.
    #[default]
    Reject,
    /// Shift colliding entries down to the next free rank.
    Renumber,
}

impl ReorderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReorderPolicy::Reject => "reject",
            ReorderPolicy::Renumber => "renumber",
        }
    }
}

impl fmt::Display for ReorderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReorderPolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ReorderPolicy::Reject),
            "renumber" => Ok(ReorderPolicy::Renumber),
            other => Err(StoreError::invalid(format!(
                "unknown reorder policy '{other}' (expected reject or renumber)"
            ))),
        }
    }
}

/// One requested rank change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankUpdate {
    pub entry_id: i64,
    pub rank: i64,
}

impl RankUpdate {
    pub fn new(entry_id: i64, rank: i64) -> Self {
        Self { entry_id, rank }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderOutcome {
    /// Entries whose requested rank was accepted.
    pub applied: usize,
    /// Updates naming entries that are not on the list, or negative ranks.
    pub skipped: usize,
    /// Entries moved off their requested rank by the renumber policy.
    pub shifted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    ReadOnly,
    Owner,
}

/// Identifiers handed back once, at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedList {
    pub id: i64,
    pub name: String,
    pub public_id: String,
    pub private_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub id: i64,
    pub rank: i64,
    pub annotation: Option<String>,
    pub movie: MovieRecord,
}

impl From<EntryWithMovie> for EntryView {
    fn from(e: EntryWithMovie) -> Self {
        Self {
            id: e.entry.id,
            rank: e.entry.rank,
            annotation: e.entry.annotation,
            movie: e.movie,
        }
    }
}

/// A list as rendered to a caller. The private identifier is only present
/// for owner access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub public_id: String,
    pub private_id: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub access: AccessLevel,
    /// Ascending by rank.
    pub entries: Vec<EntryView>,
}

pub struct ListStore<'c, T = UuidTokens, R = AfterLast> {
    conn: &'c Connection,
    policy: ReorderPolicy,
    tokens: T,
    ranks: R,
}

impl<'c> ListStore<'c, UuidTokens, AfterLast> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            policy: ReorderPolicy::default(),
            tokens: UuidTokens,
            ranks: AfterLast,
        }
    }
}

impl<'c, T: TokenGenerator, R: RankSource> ListStore<'c, T, R> {
    pub fn with_policy(mut self, policy: ReorderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tokens<U: TokenGenerator>(self, tokens: U) -> ListStore<'c, U, R> {
        ListStore {
            conn: self.conn,
            policy: self.policy,
            tokens,
            ranks: self.ranks,
        }
    }

    pub fn with_ranks<S: RankSource>(self, ranks: S) -> ListStore<'c, T, S> {
        ListStore {
            conn: self.conn,
            policy: self.policy,
            tokens: self.tokens,
            ranks,
        }
    }

    pub fn policy(&self) -> ReorderPolicy {
        self.policy
    }

    /// Create an empty list for `owner_id` with freshly generated identifiers.
    pub fn create_list(&self, owner_id: i64, name: &str) -> Result<CreatedList, StoreError> {
        let name = validate_name(name)?;
        if queries::find_user_by_id(self.conn, owner_id)?.is_none() {
            return Err(StoreError::not_found(format!("user {owner_id}")));
        }

        for attempt in 1..=MAX_IDENTIFIER_ATTEMPTS {
            let (public_id, private_id) = generate_pair(&self.tokens);
            let tx = begin_immediate(self.conn)?;
            let new = NewList {
                user_id: owner_id,
                name,
                public_id: &public_id,
                private_id: &private_id,
                is_public: true,
                created_at: None,
            };
            match operations::insert_list(&tx, &new) {
                Ok(id) => {
                    tx.commit()?;
                    log::info!("Created list {id} '{name}' for user {owner_id}");
                    return Ok(CreatedList {
                        id,
                        name: name.to_string(),
                        public_id,
                        private_id,
                    });
                }
                Err(e) if e.is_conflict() => {
                    log::warn!(
                        "List identifier collision (attempt {attempt}/{MAX_IDENTIFIER_ATTEMPTS})"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::IdentifierExhausted(MAX_IDENTIFIER_ATTEMPTS))
    }

    /// Look a list up by either identifier. Public identifiers yield a
    /// read-only view with the private identifier withheld.
    pub fn get_list(&self, identifier: &str) -> Result<ListView, StoreError> {
        match resolve_identifier(self.conn, identifier)? {
            Access::Denied => Err(StoreError::not_found("list")),
            access => self.view(&access),
        }
    }

    /// Render a list for an access decision already made by the resolver.
    pub fn view(&self, access: &Access) -> Result<ListView, StoreError> {
        let (list, level) = match access {
            Access::Denied => return Err(StoreError::Denied),
            Access::ReadOnly(list) => (list, AccessLevel::ReadOnly),
            Access::Owner(list) => (list, AccessLevel::Owner),
        };
        let entries = queries::entries_with_movies(self.conn, list.id)?
            .into_iter()
            .map(EntryView::from)
            .collect();
        Ok(ListView {
            id: list.id,
            owner_id: list.user_id,
            name: list.name.clone(),
            public_id: list.public_id.clone(),
            private_id: (level == AccessLevel::Owner).then(|| list.private_id.clone()),
            is_public: list.is_public,
            created_at: list.created_at.clone(),
            access: level,
            entries,
        })
    }

    /// Append a movie at one past the current maximum rank (0 when empty).
    ///
    /// Fails with `InvalidInput` when the list's last entry already sits on
    /// the highest representable rank.
    pub fn add_entry(
        &self,
        private_id: &str,
        movie: &MovieRef,
        annotation: Option<&str>,
    ) -> Result<EntryView, StoreError> {
        for attempt in 1..=MAX_RANK_ATTEMPTS {
            let tx = begin_immediate(self.conn)?;
            let list = owned_list(&tx, private_id)?;
            let resolved = resolve_or_create_in(&tx, movie)?;
            let rank = self.ranks.next_rank(&tx, list.id)?;

            match operations::insert_entry(&tx, list.id, resolved.movie.id, rank, annotation) {
                Ok(id) => {
                    tx.commit()?;
                    log::debug!(
                        "Added '{}' to list {} at rank {rank}",
                        resolved.movie.title,
                        list.id
                    );
                    return Ok(EntryView {
                        id,
                        rank,
                        annotation: annotation.map(str::to_string),
                        movie: resolved.movie,
                    });
                }
                Err(e) if e.is_rank_collision() => {
                    log::debug!(
                        "Rank {rank} on list {} taken (attempt {attempt}/{MAX_RANK_ATTEMPTS})",
                        list.id
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::RankContention(MAX_RANK_ATTEMPTS))
    }

    /// Apply a batch of rank changes atomically.
    ///
    /// Updates naming entries of other lists, unknown entries, or negative
    /// ranks are skipped. When an entry appears more than once the last
    /// update wins. Duplicate final ranks are handled per the store's
    /// [`ReorderPolicy`].
    pub fn reorder(
        &self,
        private_id: &str,
        updates: &[RankUpdate],
    ) -> Result<ReorderOutcome, StoreError> {
        let tx = begin_immediate(self.conn)?;
        let list = owned_list(&tx, private_id)?;

        let current: HashMap<i64, i64> = queries::entries_for_list(&tx, list.id)?
            .into_iter()
            .map(|e| (e.id, e.rank))
            .collect();

        let mut outcome = ReorderOutcome::default();
        let mut requested: HashMap<i64, i64> = HashMap::new();
        for update in updates {
            if !current.contains_key(&update.entry_id) {
                log::warn!(
                    "Entry {} is not on list {}; skipping",
                    update.entry_id,
                    list.id
                );
                outcome.skipped += 1;
                continue;
            }
            if update.rank < 0 {
                log::warn!(
                    "Negative rank {} for entry {}; skipping",
                    update.rank,
                    update.entry_id
                );
                outcome.skipped += 1;
                continue;
            }
            requested.insert(update.entry_id, update.rank);
        }
        outcome.applied = requested.len();

        let target = match find_duplicate_rank(&current, &requested) {
            None => merge_ranks(&current, &requested),
            Some(rank) => match self.policy {
                ReorderPolicy::Reject => return Err(StoreError::DuplicateRank { rank }),
                ReorderPolicy::Renumber => {
                    let (target, shifted) = renumber(&current, &requested)?;
                    outcome.shifted = shifted;
                    target
                }
            },
        };

        write_ranks(&tx, &current, &target)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Remove one entry. Remaining ranks are left as they are.
    pub fn remove_entry(&self, private_id: &str, entry_id: i64) -> Result<(), StoreError> {
        let tx = begin_immediate(self.conn)?;
        let list = owned_list(&tx, private_id)?;
        owned_entry(&tx, &list, entry_id)?;
        operations::delete_entry(&tx, entry_id)?;
        tx.commit()?;
        Ok(())
    }

    /// Set or clear the annotation on one entry.
    pub fn update_entry_annotation(
        &self,
        private_id: &str,
        entry_id: i64,
        annotation: Option<&str>,
    ) -> Result<(), StoreError> {
        let tx = begin_immediate(self.conn)?;
        let list = owned_list(&tx, private_id)?;
        owned_entry(&tx, &list, entry_id)?;
        operations::set_entry_annotation(&tx, entry_id, annotation)?;
        tx.commit()?;
        Ok(())
    }

    pub fn rename_list(&self, private_id: &str, name: &str) -> Result<(), StoreError> {
        let name = validate_name(name)?;
        let tx = begin_immediate(self.conn)?;
        let list = owned_list(&tx, private_id)?;
        operations::rename_list(&tx, list.id, name)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a list together with its entries.
    pub fn delete_list(&self, private_id: &str) -> Result<(), StoreError> {
        let tx = begin_immediate(self.conn)?;
        let list = owned_list(&tx, private_id)?;
        operations::delete_list(&tx, list.id)?;
        tx.commit()?;
        log::info!("Deleted list {} '{}'", list.id, list.name);
        Ok(())
    }

    /// Summaries of every list owned by a user, oldest first.
    pub fn lists_for_owner(&self, owner_id: i64) -> Result<Vec<ListSummary>, StoreError> {
        Ok(queries::lists_for_owner(self.conn, owner_id)?)
    }
}

fn begin_immediate(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

fn validate_name(name: &str) -> Result<&str, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::invalid("list name must not be empty"));
    }
    Ok(name)
}

fn owned_list(conn: &Connection, private_id: &str) -> Result<MovieList, StoreError> {
    queries::find_list_by_private_id(conn, private_id)?
        .ok_or_else(|| StoreError::not_found("list"))
}

fn owned_entry(conn: &Connection, list: &MovieList, entry_id: i64) -> Result<(), StoreError> {
    match queries::find_entry(conn, entry_id)? {
        Some(entry) if entry.list_id == list.id => Ok(()),
        _ => Err(StoreError::not_found(format!("entry {entry_id}"))),
    }
}

/// Final entry ranks with the accepted updates applied.
fn merge_ranks(current: &HashMap<i64, i64>, requested: &HashMap<i64, i64>) -> HashMap<i64, i64> {
    current
        .iter()
        .map(|(&id, &rank)| (id, requested.get(&id).copied().unwrap_or(rank)))
        .collect()
}

/// The lowest rank held by more than one entry after the update.
fn find_duplicate_rank(
    current: &HashMap<i64, i64>,
    requested: &HashMap<i64, i64>,
) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for rank in merge_ranks(current, requested).into_values() {
        *counts.entry(rank).or_default() += 1;
    }
    counts
        .into_iter()
        .find(|&(_, count)| count > 1)
        .map(|(rank, _)| rank)
}

/// Resolve collisions by walking entries in (rank, updated first, id) order
/// and pushing each onto the next free rank. Returns the final ranks and how
/// many entries ended up somewhere other than where they were headed.
///
/// Fails with `InvalidInput` when an entry would be pushed past `i64::MAX`.
fn renumber(
    current: &HashMap<i64, i64>,
    requested: &HashMap<i64, i64>,
) -> Result<(HashMap<i64, i64>, usize), StoreError> {
    let mut order: Vec<(i64, bool, i64)> = merge_ranks(current, requested)
        .into_iter()
        .map(|(id, rank)| (rank, !requested.contains_key(&id), id))
        .collect();
    order.sort_unstable();

    let mut target = HashMap::with_capacity(order.len());
    let mut shifted = 0;
    let mut next_free = Some(0);
    for (rank, _, id) in order {
        let Some(free) = next_free else {
            return Err(StoreError::invalid(format!(
                "no rank left above {} for entry {id}",
                i64::MAX
            )));
        };
        let placed = rank.max(free);
        if placed != rank {
            shifted += 1;
        }
        target.insert(id, placed);
        next_free = rank_after(placed);
    }
    Ok((target, shifted))
}

/// Write the target ranks in two phases so the unique index never sees a
/// transient duplicate. Changed entries first move to scratch ranks, the
/// lowest ranks that are neither held now nor wanted afterwards, then onto
/// their final ranks.
fn write_ranks(
    conn: &Connection,
    current: &HashMap<i64, i64>,
    target: &HashMap<i64, i64>,
) -> Result<(), StoreError> {
    let mut changed: Vec<(i64, i64)> = target
        .iter()
        .filter(|&(id, rank)| current.get(id) != Some(rank))
        .map(|(&id, &rank)| (id, rank))
        .collect();
    if changed.is_empty() {
        return Ok(());
    }
    changed.sort_unstable();

    for (&(id, _), scratch) in changed.iter().zip(scratch_ranks(current, target)) {
        operations::set_entry_rank(conn, id, scratch)?;
    }
    for &(id, rank) in &changed {
        operations::set_entry_rank(conn, id, rank)?;
    }
    Ok(())
}

/// Ranks in ascending order that no entry holds before or after the write.
/// At most `2 * n` ranks are in play, so the first `n` free ones lie below
/// `3 * n`.
fn scratch_ranks<'a>(
    current: &'a HashMap<i64, i64>,
    target: &'a HashMap<i64, i64>,
) -> impl Iterator<Item = i64> + 'a {
    let in_play: HashSet<i64> = current.values().chain(target.values()).copied().collect();
    (0..).filter(move |rank| !in_play.contains(rank))
}
