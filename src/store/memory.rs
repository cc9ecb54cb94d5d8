//! In-process store for tests and embedded use.
//!
//! Keeps every record in a single map behind a `parking_lot::Mutex`. Expiry
//! runs against an internal clock that never moves on its own; tests advance
//! it explicitly and expired records are purged lazily on access. Every
//! served command bumps a counter so callers can observe exactly how many
//! round trips a code path costs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use regex::Regex;
use tracing::debug;

use crate::error::{Result, StoreError};

use super::traits::{Placement, RawValue, ScoreBound, StoreConnection};

// ============================================================================
// StoredRecord
// ============================================================================

/// One record and its kind. A key holds at most one of these at a time.
enum StoredRecord {
    Scalar(RawValue),
    Hash(IndexMap<String, RawValue>),
    List(Vec<RawValue>),
    Set(IndexSet<String>),
    Zset(IndexMap<String, f64>),
}

// ============================================================================
// MemoryStore
// ============================================================================

pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// Commands served so far.
    commands: AtomicU64,
}

#[derive(Default)]
struct Inner {
    /// key → record
    records: HashMap<String, StoredRecord>,
    /// key → expiry deadline on the internal clock
    deadlines: HashMap<String, Duration>,
    /// Internal clock. Starts at zero, moves only via `advance_clock`.
    now: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            commands: AtomicU64::new(0),
        }
    }

    /// A fresh store behind an `Arc`, ready to hand to record handles.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Move the internal clock forward. Records whose deadline falls at or
    /// before the new time are purged on their next access.
    pub fn advance_clock(&self, by: Duration) {
        self.inner.lock().now += by;
    }

    /// How many commands this store has served.
    pub fn command_count(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    fn bump(&self) {
        self.commands.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Drop `key` if its deadline has passed.
    fn purge(&mut self, key: &str) {
        if let Some(deadline) = self.deadlines.get(key) {
            if *deadline <= self.now {
                self.deadlines.remove(key);
                self.records.remove(key);
            }
        }
    }

    /// Drop every record whose deadline has passed.
    fn purge_expired(&mut self) {
        let due: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= self.now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in due {
            self.deadlines.remove(&key);
            self.records.remove(&key);
        }
    }

    /// A collection that lost its last element ceases to exist.
    fn drop_if_empty(&mut self, key: &str) {
        let empty = match self.records.get(key) {
            Some(StoredRecord::Hash(fields)) => fields.is_empty(),
            Some(StoredRecord::List(items)) => items.is_empty(),
            Some(StoredRecord::Set(members)) => members.is_empty(),
            Some(StoredRecord::Zset(entries)) => entries.is_empty(),
            _ => false,
        };
        if empty {
            self.records.remove(key);
            self.deadlines.remove(key);
        }
    }

    fn remove_record(&mut self, key: &str) -> bool {
        self.deadlines.remove(key);
        self.records.remove(key).is_some()
    }

    // -----------------------------------------------------------------------
    // Kind accessors. The `*_entry` variants create an empty record of the
    // kind when the key is absent; all return None on a kind mismatch.
    // -----------------------------------------------------------------------

    fn hash(&self, key: &str) -> Option<&IndexMap<String, RawValue>> {
        match self.records.get(key) {
            Some(StoredRecord::Hash(fields)) => Some(fields),
            _ => None,
        }
    }

    fn hash_mut(&mut self, key: &str) -> Option<&mut IndexMap<String, RawValue>> {
        match self.records.get_mut(key) {
            Some(StoredRecord::Hash(fields)) => Some(fields),
            _ => None,
        }
    }

    fn hash_entry(&mut self, key: &str) -> Option<&mut IndexMap<String, RawValue>> {
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| StoredRecord::Hash(IndexMap::new()));
        match record {
            StoredRecord::Hash(fields) => Some(fields),
            _ => None,
        }
    }

    fn list(&self, key: &str) -> Option<&Vec<RawValue>> {
        match self.records.get(key) {
            Some(StoredRecord::List(items)) => Some(items),
            _ => None,
        }
    }

    fn list_mut(&mut self, key: &str) -> Option<&mut Vec<RawValue>> {
        match self.records.get_mut(key) {
            Some(StoredRecord::List(items)) => Some(items),
            _ => None,
        }
    }

    fn list_entry(&mut self, key: &str) -> Option<&mut Vec<RawValue>> {
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| StoredRecord::List(Vec::new()));
        match record {
            StoredRecord::List(items) => Some(items),
            _ => None,
        }
    }

    fn set(&self, key: &str) -> Option<&IndexSet<String>> {
        match self.records.get(key) {
            Some(StoredRecord::Set(members)) => Some(members),
            _ => None,
        }
    }

    fn set_mut(&mut self, key: &str) -> Option<&mut IndexSet<String>> {
        match self.records.get_mut(key) {
            Some(StoredRecord::Set(members)) => Some(members),
            _ => None,
        }
    }

    fn set_entry(&mut self, key: &str) -> Option<&mut IndexSet<String>> {
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| StoredRecord::Set(IndexSet::new()));
        match record {
            StoredRecord::Set(members) => Some(members),
            _ => None,
        }
    }

    fn zset_mut(&mut self, key: &str) -> Option<&mut IndexMap<String, f64>> {
        match self.records.get_mut(key) {
            Some(StoredRecord::Zset(entries)) => Some(entries),
            _ => None,
        }
    }

    fn zset_entry(&mut self, key: &str) -> Option<&mut IndexMap<String, f64>> {
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| StoredRecord::Zset(IndexMap::new()));
        match record {
            StoredRecord::Zset(entries) => Some(entries),
            _ => None,
        }
    }

    /// Snapshot of a set, empty when absent or of another kind.
    fn set_clone(&self, key: &str) -> IndexSet<String> {
        match self.records.get(key) {
            Some(StoredRecord::Set(members)) => members.clone(),
            _ => IndexSet::new(),
        }
    }

    /// Snapshot of an ordered set, empty when absent or of another kind.
    fn zset_clone(&self, key: &str) -> IndexMap<String, f64> {
        match self.records.get(key) {
            Some(StoredRecord::Zset(entries)) => entries.clone(),
            _ => IndexMap::new(),
        }
    }

    /// Error when a live record under `key` is not an ordered set.
    fn require_zset(&self, key: &str) -> Result<()> {
        match self.records.get(key) {
            None | Some(StoredRecord::Zset(_)) => Ok(()),
            Some(_) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    /// Snapshot of an ordered set sorted by (score, member).
    fn zset_sorted(&self, key: &str) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = match self.records.get(key) {
            Some(StoredRecord::Zset(entries)) => {
                entries.iter().map(|(m, s)| (m.clone(), *s)).collect()
            }
            _ => Vec::new(),
        };
        entries.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// Replace `dest` with a computed set. An empty result deletes `dest`.
    fn write_set_result(&mut self, dest: &str, members: IndexSet<String>) -> usize {
        let size = members.len();
        if size == 0 {
            self.remove_record(dest);
        } else {
            self.deadlines.remove(dest);
            self.records.insert(dest.to_string(), StoredRecord::Set(members));
        }
        size
    }

    /// Replace `dest` with a computed ordered set. An empty result deletes it.
    fn write_zset_result(&mut self, dest: &str, entries: IndexMap<String, f64>) -> usize {
        let size = entries.len();
        if size == 0 {
            self.remove_record(dest);
        } else {
            self.deadlines.remove(dest);
            self.records.insert(dest.to_string(), StoredRecord::Zset(entries));
        }
        size
    }
}

/// Clamp `start..=stop` (negative counts from the end) to valid positions.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let n = len as i64;
    let mut start = if start < 0 { n + start } else { start };
    let mut stop = if stop < 0 { n + stop } else { stop };
    if start < 0 {
        start = 0;
    }
    if stop >= n {
        stop = n - 1;
    }
    if start > stop || start >= n || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Resolve one index (negative counts from the end) into a valid position.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let n = len as i64;
    let i = if index < 0 { n + index } else { index };
    if i < 0 || i >= n {
        None
    } else {
        Some(i as usize)
    }
}

fn parse_int(key: &str, bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| StoreError::WrongType {
            key: key.to_string(),
        })
}

fn parse_float(key: &str, bytes: &[u8]) -> Result<f64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(|| StoreError::WrongType {
            key: key.to_string(),
        })
}

fn weight(weights: Option<&[f64]>, index: usize) -> f64 {
    weights
        .and_then(|w| w.get(index))
        .copied()
        .unwrap_or(1.0)
}

/// Compile a glob pattern (`*`, `?`, `[...]`, `\` escape) to a regex.
fn glob_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => {
                re.push('[');
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    re.push(inner);
                }
                re.push(']');
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    re.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| StoreError::Backend(e.to_string()))
}

// ============================================================================
// StoreConnection implementation
// ============================================================================

impl StoreConnection for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.records.contains_key(key))
    }

    fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            return Ok(false);
        }
        let deadline = inner.now + Duration::from_secs(seconds);
        inner.deadlines.insert(key.to_string(), deadline);
        Ok(true)
    }

    fn persist(&self, key: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            return Ok(false);
        }
        Ok(inner.deadlines.remove(key).is_some())
    }

    fn ttl(&self, key: &str) -> Result<i64> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            return Ok(-2);
        }
        match inner.deadlines.get(key) {
            None => Ok(-1),
            Some(deadline) => Ok(deadline.saturating_sub(inner.now).as_secs() as i64),
        }
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.remove_record(key))
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    fn get(&self, key: &str) -> Result<Option<RawValue>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        match inner.records.get(key) {
            Some(StoredRecord::Scalar(bytes)) => Ok(Some(bytes.clone())),
            _ => Ok(None),
        }
    }

    fn set(&self, key: &str, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.deadlines.remove(key);
        inner.records.insert(key.to_string(), StoredRecord::Scalar(value));
        Ok(true)
    }

    fn set_nx(&self, key: &str, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if inner.records.contains_key(key) {
            return Ok(false);
        }
        inner.records.insert(key.to_string(), StoredRecord::Scalar(value));
        Ok(true)
    }

    fn incr_by(&self, key: &str, by: i64) -> Result<i64> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            inner
                .records
                .insert(key.to_string(), StoredRecord::Scalar(by.to_string().into_bytes()));
            return Ok(by);
        }
        let Some(StoredRecord::Scalar(bytes)) = inner.records.get_mut(key) else {
            return Err(StoreError::WrongType {
                key: key.to_string(),
            });
        };
        let current = parse_int(key, bytes)?;
        let next = current.checked_add(by).ok_or_else(|| {
            StoreError::Backend(format!("integer overflow incrementing {}", key))
        })?;
        *bytes = next.to_string().into_bytes();
        Ok(next)
    }

    fn incr_by_float(&self, key: &str, by: f64) -> Result<f64> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            inner
                .records
                .insert(key.to_string(), StoredRecord::Scalar(format!("{}", by).into_bytes()));
            return Ok(by);
        }
        let Some(StoredRecord::Scalar(bytes)) = inner.records.get_mut(key) else {
            return Err(StoreError::WrongType {
                key: key.to_string(),
            });
        };
        let current = parse_float(key, bytes)?;
        let next = current + by;
        if !next.is_finite() {
            return Err(StoreError::Backend(format!(
                "float overflow incrementing {}",
                key
            )));
        }
        *bytes = format!("{}", next).into_bytes();
        Ok(next)
    }

    // ------------------------------------------------------------------
    // Hashes
    // ------------------------------------------------------------------

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<RawValue>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.hash(key).and_then(|fields| fields.get(field).cloned()))
    }

    fn hash_set(&self, key: &str, field: &str, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(fields) = inner.hash_entry(key) else {
            return Ok(false);
        };
        fields.insert(field.to_string(), value);
        Ok(true)
    }

    fn hash_set_nx(&self, key: &str, field: &str, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(fields) = inner.hash_entry(key) else {
            return Ok(false);
        };
        if fields.contains_key(field) {
            return Ok(false);
        }
        fields.insert(field.to_string(), value);
        Ok(true)
    }

    fn hash_delete(&self, key: &str, field: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let removed = match inner.hash_mut(key) {
            Some(fields) => fields.shift_remove(field).is_some(),
            None => false,
        };
        if removed {
            inner.drop_if_empty(key);
        }
        Ok(removed)
    }

    fn hash_len(&self, key: &str) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.hash(key).map_or(0, |fields| fields.len()))
    }

    fn hash_get_all(&self, key: &str) -> Result<Vec<(String, RawValue)>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.hash(key).map_or_else(Vec::new, |fields| {
            fields
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()
        }))
    }

    fn hash_incr_by(&self, key: &str, field: &str, by: i64) -> Result<i64> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(fields) = inner.hash_entry(key) else {
            return Err(StoreError::WrongType {
                key: key.to_string(),
            });
        };
        let current = match fields.get(field) {
            Some(bytes) => parse_int(key, bytes)?,
            None => 0,
        };
        let next = current.checked_add(by).ok_or_else(|| {
            StoreError::Backend(format!("integer overflow incrementing {}", key))
        })?;
        fields.insert(field.to_string(), next.to_string().into_bytes());
        Ok(next)
    }

    fn hash_incr_by_float(&self, key: &str, field: &str, by: f64) -> Result<f64> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(fields) = inner.hash_entry(key) else {
            return Err(StoreError::WrongType {
                key: key.to_string(),
            });
        };
        let current = match fields.get(field) {
            Some(bytes) => parse_float(key, bytes)?,
            None => 0.0,
        };
        let next = current + by;
        if !next.is_finite() {
            return Err(StoreError::Backend(format!(
                "float overflow incrementing {}",
                key
            )));
        }
        fields.insert(field.to_string(), format!("{}", next).into_bytes());
        Ok(next)
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    fn list_push_front(&self, key: &str, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(items) = inner.list_entry(key) else {
            return Ok(false);
        };
        items.insert(0, value);
        Ok(true)
    }

    fn list_push_back(&self, key: &str, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(items) = inner.list_entry(key) else {
            return Ok(false);
        };
        items.push(value);
        Ok(true)
    }

    fn list_push_back_many(&self, key: &str, values: &[RawValue]) -> Result<Option<usize>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(items) = inner.list_entry(key) else {
            return Ok(None);
        };
        items.extend(values.iter().cloned());
        let len = items.len();
        inner.drop_if_empty(key);
        Ok(Some(len))
    }

    fn list_pop_front(&self, key: &str) -> Result<Option<RawValue>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let popped = match inner.list_mut(key) {
            Some(items) if !items.is_empty() => Some(items.remove(0)),
            _ => None,
        };
        if popped.is_some() {
            inner.drop_if_empty(key);
        }
        Ok(popped)
    }

    fn list_pop_back(&self, key: &str) -> Result<Option<RawValue>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let popped = match inner.list_mut(key) {
            Some(items) => items.pop(),
            None => None,
        };
        if popped.is_some() {
            inner.drop_if_empty(key);
        }
        Ok(popped)
    }

    fn list_set(&self, key: &str, index: i64, value: RawValue) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(items) = inner.list_mut(key) else {
            return Ok(false);
        };
        let Some(i) = resolve_index(items.len(), index) else {
            return Ok(false);
        };
        items[i] = value;
        Ok(true)
    }

    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<RawValue>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(items) = inner.list(key) else {
            return Ok(Vec::new());
        };
        let Some((start, stop)) = resolve_range(items.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(items[start..=stop].to_vec())
    }

    fn list_trim(&self, key: &str, start: i64, stop: i64) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            return Ok(true);
        }
        let Some(items) = inner.list_mut(key) else {
            return Ok(false);
        };
        match resolve_range(items.len(), start, stop) {
            Some((start, stop)) => {
                items.truncate(stop + 1);
                items.drain(..start);
            }
            None => items.clear(),
        }
        inner.drop_if_empty(key);
        Ok(true)
    }

    fn list_len(&self, key: &str) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.list(key).map_or(0, |items| items.len()))
    }

    fn list_insert(
        &self,
        key: &str,
        place: Placement,
        pivot: &[u8],
        value: RawValue,
    ) -> Result<i64> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        if !inner.records.contains_key(key) {
            return Ok(0);
        }
        let Some(items) = inner.list_mut(key) else {
            return Ok(-1);
        };
        let Some(pos) = items.iter().position(|v| v.as_slice() == pivot) else {
            return Ok(-1);
        };
        let at = match place {
            Placement::Before => pos,
            Placement::After => pos + 1,
        };
        items.insert(at, value);
        Ok(items.len() as i64)
    }

    fn list_remove(&self, key: &str, value: &[u8], count: i64) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(items) = inner.list_mut(key) else {
            return Ok(0);
        };
        let positions: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_slice() == value)
            .map(|(i, _)| i)
            .collect();
        let mut selected: Vec<usize> = if count > 0 {
            positions.into_iter().take(count as usize).collect()
        } else if count < 0 {
            let take = count.unsigned_abs() as usize;
            positions.into_iter().rev().take(take).collect()
        } else {
            positions
        };
        let removed = selected.len();
        selected.sort_unstable_by(|a, b| b.cmp(a));
        for i in selected {
            items.remove(i);
        }
        inner.drop_if_empty(key);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(members) = inner.set_entry(key) else {
            return Ok(false);
        };
        Ok(members.insert(member.to_string()))
    }

    fn set_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let removed = match inner.set_mut(key) {
            Some(members) => members.shift_remove(member),
            None => false,
        };
        if removed {
            inner.drop_if_empty(key);
        }
        Ok(removed)
    }

    fn set_card(&self, key: &str) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.set(key).map_or(0, |members| members.len()))
    }

    fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner
            .set(key)
            .map_or_else(Vec::new, |members| members.iter().cloned().collect()))
    }

    fn set_random_member(&self, key: &str) -> Result<Option<String>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        // Arbitrary pick; this store hands back the oldest member.
        Ok(inner
            .set(key)
            .and_then(|members| members.first().cloned()))
    }

    fn set_pop(&self, key: &str) -> Result<Option<String>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let popped = match inner.set_mut(key) {
            Some(members) => members.shift_remove_index(0),
            None => None,
        };
        if popped.is_some() {
            inner.drop_if_empty(key);
        }
        Ok(popped)
    }

    fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner.set(key).is_some_and(|members| members.contains(member)))
    }

    fn set_diff(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
        }
        Ok(diff_sets(&inner, keys).into_iter().collect())
    }

    fn set_diff_store(&self, dest: &str, keys: &[&str]) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
        }
        inner.purge(dest);
        let result = diff_sets(&inner, keys);
        Ok(inner.write_set_result(dest, result))
    }

    fn set_inter(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
        }
        Ok(inter_sets(&inner, keys).into_iter().collect())
    }

    fn set_inter_store(&self, dest: &str, keys: &[&str]) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
        }
        inner.purge(dest);
        let result = inter_sets(&inner, keys);
        Ok(inner.write_set_result(dest, result))
    }

    fn set_union(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
        }
        Ok(union_sets(&inner, keys).into_iter().collect())
    }

    fn set_union_store(&self, dest: &str, keys: &[&str]) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
        }
        inner.purge(dest);
        let result = union_sets(&inner, keys);
        Ok(inner.write_set_result(dest, result))
    }

    fn set_move(&self, source: &str, dest: &str, member: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(source);
        inner.purge(dest);
        match inner.records.get(dest) {
            None | Some(StoredRecord::Set(_)) => {}
            Some(_) => return Ok(false),
        }
        let moved = match inner.set_mut(source) {
            Some(members) => members.shift_remove(member),
            None => false,
        };
        if !moved {
            return Ok(false);
        }
        inner.drop_if_empty(source);
        if let Some(members) = inner.set_entry(dest) {
            members.insert(member.to_string());
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Ordered sets
    // ------------------------------------------------------------------

    fn zset_add(&self, key: &str, member: &str, score: f64) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(entries) = inner.zset_entry(key) else {
            return Ok(false);
        };
        Ok(entries.insert(member.to_string(), score).is_none())
    }

    fn zset_remove(&self, key: &str, member: &str) -> Result<bool> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let removed = match inner.zset_mut(key) {
            Some(entries) => entries.shift_remove(member).is_some(),
            None => false,
        };
        if removed {
            inner.drop_if_empty(key);
        }
        Ok(removed)
    }

    fn zset_card(&self, key: &str) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        match inner.records.get(key) {
            Some(StoredRecord::Zset(entries)) => Ok(entries.len()),
            _ => Ok(0),
        }
    }

    fn zset_score(&self, key: &str, member: &str) -> Result<Option<f64>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        match inner.records.get(key) {
            Some(StoredRecord::Zset(entries)) => Ok(entries.get(member).copied()),
            _ => Ok(None),
        }
    }

    fn zset_incr_by(&self, key: &str, member: &str, by: f64) -> Result<Option<f64>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let Some(entries) = inner.zset_entry(key) else {
            return Ok(None);
        };
        let next = entries.get(member).copied().unwrap_or(0.0) + by;
        entries.insert(member.to_string(), next);
        Ok(Some(next))
    }

    fn zset_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<(String, f64)>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let entries = inner.zset_sorted(key);
        let Some((start, stop)) = resolve_range(entries.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(entries[start..=stop].to_vec())
    }

    fn zset_range_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<Vec<(String, f64)>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        Ok(inner
            .zset_sorted(key)
            .into_iter()
            .filter(|(_, score)| min.allows_as_min(*score) && max.allows_as_max(*score))
            .collect())
    }

    fn zset_rev_range_by_score(
        &self,
        key: &str,
        max: ScoreBound,
        min: ScoreBound,
    ) -> Result<Vec<(String, f64)>> {
        self.bump();
        let mut inner = self.inner.lock();
        inner.purge(key);
        let mut matched: Vec<(String, f64)> = inner
            .zset_sorted(key)
            .into_iter()
            .filter(|(_, score)| min.allows_as_min(*score) && max.allows_as_max(*score))
            .collect();
        matched.reverse();
        Ok(matched)
    }

    fn zset_inter_store(
        &self,
        dest: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
    ) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
            inner.require_zset(key)?;
        }
        inner.purge(dest);
        inner.require_zset(dest)?;
        let sources: Vec<IndexMap<String, f64>> =
            keys.iter().map(|key| inner.zset_clone(key)).collect();
        let mut result = IndexMap::new();
        if let Some((first, rest)) = sources.split_first() {
            'members: for (member, score) in first {
                let mut total = score * weight(weights, 0);
                for (i, other) in rest.iter().enumerate() {
                    match other.get(member) {
                        Some(s) => total += s * weight(weights, i + 1),
                        None => continue 'members,
                    }
                }
                result.insert(member.clone(), total);
            }
        }
        Ok(inner.write_zset_result(dest, result))
    }

    fn zset_union_store(
        &self,
        dest: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
    ) -> Result<usize> {
        self.bump();
        let mut inner = self.inner.lock();
        for key in keys {
            inner.purge(key);
            inner.require_zset(key)?;
        }
        inner.purge(dest);
        inner.require_zset(dest)?;
        let sources: Vec<IndexMap<String, f64>> =
            keys.iter().map(|key| inner.zset_clone(key)).collect();
        let mut result: IndexMap<String, f64> = IndexMap::new();
        for (i, source) in sources.iter().enumerate() {
            let w = weight(weights, i);
            for (member, score) in source {
                *result.entry(member.clone()).or_insert(0.0) += score * w;
            }
        }
        Ok(inner.write_zset_result(dest, result))
    }

    // ------------------------------------------------------------------
    // Bulk maintenance
    // ------------------------------------------------------------------

    fn delete_matching(&self, pattern: &str) -> Result<Option<u64>> {
        self.bump();
        let re = glob_regex(pattern)?;
        let mut inner = self.inner.lock();
        inner.purge_expired();
        let matched: Vec<String> = inner
            .records
            .keys()
            .filter(|key| re.is_match(key))
            .cloned()
            .collect();
        if matched.is_empty() {
            return Ok(None);
        }
        for key in &matched {
            inner.remove_record(key);
        }
        debug!(pattern, deleted = matched.len(), "deleted keys matching pattern");
        Ok(Some(matched.len() as u64))
    }

    fn rename_matching(&self, pattern: &str, from: &str, to: &str) -> Result<u64> {
        self.bump();
        let re = glob_regex(pattern)?;
        let mut inner = self.inner.lock();
        inner.purge_expired();
        let matched: Vec<String> = inner
            .records
            .keys()
            .filter(|key| re.is_match(key))
            .cloned()
            .collect();
        for key in &matched {
            let renamed = key.replace(from, to);
            if renamed == *key {
                continue;
            }
            if let Some(record) = inner.records.remove(key) {
                inner.records.insert(renamed.clone(), record);
            }
            match inner.deadlines.remove(key) {
                Some(deadline) => {
                    inner.deadlines.insert(renamed, deadline);
                }
                None => {
                    inner.deadlines.remove(&renamed);
                }
            }
        }
        debug!(pattern, renamed = matched.len(), "renamed keys matching pattern");
        Ok(matched.len() as u64)
    }
}

fn diff_sets(inner: &Inner, keys: &[&str]) -> IndexSet<String> {
    let Some((first, rest)) = keys.split_first() else {
        return IndexSet::new();
    };
    let mut result = inner.set_clone(first);
    for key in rest {
        let other = inner.set_clone(key);
        result.retain(|member| !other.contains(member));
    }
    result
}

fn inter_sets(inner: &Inner, keys: &[&str]) -> IndexSet<String> {
    let Some((first, rest)) = keys.split_first() else {
        return IndexSet::new();
    };
    let mut result = inner.set_clone(first);
    for key in rest {
        let other = inner.set_clone(key);
        result.retain(|member| other.contains(member));
    }
    result
}

fn union_sets(inner: &Inner, keys: &[&str]) -> IndexSet<String> {
    let mut result = IndexSet::new();
    for key in keys {
        result.extend(inner.set_clone(key));
    }
    result
}

// ============================================================================
// Tests
// ============================================================================
