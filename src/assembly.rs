// Record ids and placeholder records
use crate::model::{Record, Source, StorageError};
use crate::utils::now_local;

fn exhausted() -> StorageError {
    StorageError::Corrupt("record id space exhausted".to_string())
}

/// `max(ids) + 1`, or 1 when there are no ids.
pub fn next_id<I>(ids: I) -> Result<u64, StorageError>
where
    I: IntoIterator<Item = u64>,
{
    match ids.into_iter().max() {
        Some(max) => max.checked_add(1).ok_or_else(exhausted),
        None => Ok(1),
    }
}

/// Hands out record ids in scrape order. Never repeats an id: once `u64::MAX`
/// has been handed out the sequence is exhausted.
#[derive(Debug)]
pub struct IdSequence {
    next: Option<u64>,
}

impl IdSequence {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: Some(first.max(1)),
        }
    }

    pub fn next_id(&mut self) -> Result<u64, StorageError> {
        let id = self.next.ok_or_else(exhausted)?;
        self.next = id.checked_add(1);
        Ok(id)
    }
}

/// A record for a visit that produced nothing: every optional field absent
/// and `url` left as the requested link.
pub fn placeholder_record(id: u64, title: &str, source: Source, url: &str) -> Record {
    Record {
        id,
        isbn: None,
        title: title.to_string(),
        author: None,
        source,
        price: None,
        timestamp: now_local(),
        url: url.to_string(),
    }
}
