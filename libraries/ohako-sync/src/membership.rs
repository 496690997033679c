//! Membership cache
//!
//! Boolean relations keyed by `(RelationKind, SubjectId)`. A missing key is
//! *unknown*, never false.
//!
//! Every write (optimistic or authoritative) stamps the key with a version
//! taken from a cache-wide counter, so versions only grow. A rollback carries
//! the version its write was issued at and is applied only while the key
//! still holds that version; once anything newer has landed the rollback is
//! refused with [`SyncError::StaleMutation`] and nothing changes.
//!
//! A confirmation is the opposite case: the server accepted the write, so its
//! value is re-applied over any authoritative snapshot that was fetched while
//! the call was in flight. Only a later optimistic write can refuse it.

use crate::error::{Result, SyncError};
use ohako_core::{RelationKind, SubjectId};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

type Key = (RelationKind, SubjectId);

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    value: Option<bool>,
    pending: bool,
    version: u64,
    /// Version of the last optimistic write
    optimistic: u64,
}

/// Receipt for an optimistic write, needed to undo it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct OptimisticWrite {
    /// Value before the write (`None` when it was unknown)
    pub previous: Option<bool>,
    /// Version the write was stamped with
    pub version: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Key, Entry>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

#[derive(Debug, Default)]
pub struct MembershipCache {
    inner: Mutex<Inner>,
}

impl MembershipCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value, or `None` when unknown
    pub fn get(&self, kind: RelationKind, subject: &SubjectId) -> Option<bool> {
        self.lock()
            .entries
            .get(&(kind, subject.clone()))
            .and_then(|e| e.value)
    }

    /// Mark subjects as awaiting an authoritative answer.
    ///
    /// Existing values are kept until [`MembershipCache::set_many`] resolves them.
    pub fn hydrate<I>(&self, kind: RelationKind, subjects: I)
    where
        I: IntoIterator<Item = SubjectId>,
    {
        let mut inner = self.lock();
        let mut count = 0usize;
        for subject in subjects {
            inner.entries.entry((kind, subject)).or_default().pending = true;
            count += 1;
        }
        debug!(kind = %kind, subjects = count, "Hydration requested");
    }

    /// Overwrite values from an authoritative response
    pub fn set_many<I>(&self, kind: RelationKind, values: I)
    where
        I: IntoIterator<Item = (SubjectId, bool)>,
    {
        let mut inner = self.lock();
        let mut count = 0usize;
        for (subject, value) in values {
            let version = inner.tick();
            let entry = inner.entries.entry((kind, subject)).or_default();
            entry.value = Some(value);
            entry.pending = false;
            entry.version = version;
            count += 1;
        }
        debug!(kind = %kind, subjects = count, "Authoritative values applied");
    }

    /// Apply a complete membership snapshot for `kind`.
    ///
    /// Every subject in `members` becomes true, every other cached subject of
    /// the same kind becomes false.
    pub fn set_complete(&self, kind: RelationKind, members: &HashSet<SubjectId>) {
        let mut inner = self.lock();
        let mut subjects: Vec<SubjectId> = inner
            .entries
            .keys()
            .filter(|(k, s)| *k == kind && !members.contains(s))
            .map(|(_, s)| s.clone())
            .collect();
        let absent = subjects.len();
        subjects.extend(members.iter().cloned());

        for subject in subjects {
            let value = members.contains(&subject);
            let version = inner.tick();
            let entry = inner.entries.entry((kind, subject)).or_default();
            entry.value = Some(value);
            entry.pending = false;
            entry.version = version;
        }
        debug!(kind = %kind, members = members.len(), absent, "Complete snapshot applied");
    }

    /// Write a value ahead of the server's confirmation
    pub fn set_optimistic(
        &self,
        kind: RelationKind,
        subject: &SubjectId,
        value: bool,
    ) -> OptimisticWrite {
        let mut inner = self.lock();
        let version = inner.tick();
        let entry = inner.entries.entry((kind, subject.clone())).or_default();
        let previous = entry.value.replace(value);
        entry.version = version;
        entry.optimistic = version;

        debug!(
            kind = %kind,
            subject = %subject,
            value,
            previous = ?previous,
            version,
            "Optimistic write"
        );
        OptimisticWrite { previous, version }
    }

    /// Undo an optimistic write if nothing newer has landed on the key
    pub fn rollback(
        &self,
        kind: RelationKind,
        subject: &SubjectId,
        previous: Option<bool>,
        version: u64,
    ) -> Result<()> {
        let mut inner = self.lock();
        let current = inner
            .entries
            .get(&(kind, subject.clone()))
            .map_or(0, |e| e.version);

        if current != version {
            return Err(SyncError::StaleMutation {
                kind,
                subject: subject.clone(),
                issued: version,
                current,
            });
        }

        if let Some(entry) = inner.entries.get_mut(&(kind, subject.clone())) {
            entry.value = previous;
        }
        debug!(kind = %kind, subject = %subject, previous = ?previous, version, "Rolled back");
        Ok(())
    }

    /// Re-apply a write the server accepted.
    ///
    /// Refused when a newer optimistic write has been issued for the key or
    /// the key was dropped since.
    pub fn confirm(
        &self,
        kind: RelationKind,
        subject: &SubjectId,
        value: bool,
        version: u64,
    ) -> Result<()> {
        let mut inner = self.lock();
        let current = inner
            .entries
            .get(&(kind, subject.clone()))
            .map_or(0, |e| e.optimistic);

        if current != version {
            return Err(SyncError::StaleMutation {
                kind,
                subject: subject.clone(),
                issued: version,
                current,
            });
        }

        let stamp = inner.tick();
        if let Some(entry) = inner.entries.get_mut(&(kind, subject.clone())) {
            entry.value = Some(value);
            entry.pending = false;
            entry.version = stamp;
        }
        debug!(kind = %kind, subject = %subject, value, version, "Confirmed");
        Ok(())
    }

    /// Whether the subject is waiting for hydration
    pub fn is_pending(&self, kind: RelationKind, subject: &SubjectId) -> bool {
        self.lock()
            .entries
            .get(&(kind, subject.clone()))
            .is_some_and(|e| e.pending)
    }

    /// Version of the last write to the key, 0 if never written
    pub fn version(&self, kind: RelationKind, subject: &SubjectId) -> u64 {
        self.lock()
            .entries
            .get(&(kind, subject.clone()))
            .map_or(0, |e| e.version)
    }

    /// Drop entries for subjects no longer on screen
    pub fn discard<I>(&self, kind: RelationKind, subjects: I)
    where
        I: IntoIterator<Item = SubjectId>,
    {
        let mut inner = self.lock();
        for subject in subjects {
            inner.entries.remove(&(kind, subject));
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().entries.clear();
        debug!("Membership cache cleared");
    }

    /// Known values for `kind`
    pub fn snapshot(&self, kind: RelationKind) -> HashMap<SubjectId, bool> {
        self.lock()
            .entries
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .filter_map(|((_, s), e)| e.value.map(|v| (s.clone(), v)))
            .collect()
    }

    /// Number of entries, known or pending
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
