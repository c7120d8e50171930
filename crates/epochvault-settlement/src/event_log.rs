//! Append-only, hash-chained log of committed ledger events.
//!
//! Records are staged first and appended only when the enclosing engine
//! operation commits, so a rolled-back operation leaves no trace here.

use chrono::Utc;
use epochvault_types::{
    constants::GENESIS_DIGEST, EpochvaultError, EventRecord, LedgerEvent, ParticipantId, Result,
};

/// Committed events in order, each bound to its predecessor by digest.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Digest of the newest record, or the genesis digest when empty.
    #[must_use]
    pub fn head_digest(&self) -> [u8; 32] {
        self.records.last().map_or(GENESIS_DIGEST, |r| r.digest)
    }

    /// Build records for `events` as if appended now, without appending.
    pub fn stage(&self, events: &[LedgerEvent]) -> Result<Vec<EventRecord>> {
        let mut prev = self.head_digest();
        let mut next_seq = self.records.len() as u64;
        let mut staged = Vec::with_capacity(events.len());
        for event in events {
            let digest = EventRecord::compute_digest(&prev, next_seq, event)?;
            staged.push(EventRecord {
                sequence: next_seq,
                event: event.clone(),
                recorded_at: Utc::now(),
                digest,
            });
            prev = digest;
            next_seq += 1;
        }
        Ok(staged)
    }

    /// Append records previously produced by [`Self::stage`] on this log.
    pub(crate) fn extend(&mut self, staged: Vec<EventRecord>) {
        self.records.extend(staged);
    }

    /// Stage and append a single event.
    pub fn append(&mut self, event: LedgerEvent) -> Result<&EventRecord> {
        let staged = self.stage(std::slice::from_ref(&event))?;
        self.extend(staged);
        self.records
            .last()
            .ok_or_else(|| EpochvaultError::Internal("event log empty after append".into()))
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Events concerning one participant, oldest first.
    pub fn for_participant(
        &self,
        participant: ParticipantId,
    ) -> impl Iterator<Item = &EventRecord> {
        self.records
            .iter()
            .filter(move |r| r.event.participant() == participant)
    }

    /// Recompute every digest and check sequence numbers.
    ///
    /// # Errors
    /// `Internal` naming the first record that does not match.
    pub fn verify_chain(&self) -> Result<()> {
        let mut prev = GENESIS_DIGEST;
        for (position, record) in self.records.iter().enumerate() {
            if record.sequence != position as u64 {
                return Err(EpochvaultError::Internal(format!(
                    "event {position} carries sequence {}",
                    record.sequence
                )));
            }
            let expected = EventRecord::compute_digest(&prev, record.sequence, &record.event)?;
            if expected != record.digest {
                return Err(EpochvaultError::Internal(format!(
                    "event {position} digest {} != expected {}",
                    record.digest_hex(),
                    hex::encode(expected)
                )));
            }
            prev = record.digest;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epochvault_types::{AssetId, EpochId};

    fn deposited(p: ParticipantId, n: u128) -> LedgerEvent {
        LedgerEvent::Deposited {
            participant: p,
            asset_id: AssetId::from_u128(n),
            epoch: EpochId(0),
        }
    }

    #[test]
    fn empty_log_has_genesis_head() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.head_digest(), GENESIS_DIGEST);
        log.verify_chain().unwrap();
    }

    #[test]
    fn append_chains_digests() {
        let mut log = EventLog::new();
        let p = ParticipantId::new();
        let first = log.append(deposited(p, 1)).unwrap().digest;
        let second = log.append(deposited(p, 2)).unwrap().clone();
        assert_eq!(second.sequence, 1);
        assert_eq!(
            second.digest,
            EventRecord::compute_digest(&first, 1, &second.event).unwrap()
        );
        log.verify_chain().unwrap();
    }

    #[test]
    fn stage_does_not_append() {
        let log = EventLog::new();
        let p = ParticipantId::new();
        let staged = log.stage(&[deposited(p, 1), deposited(p, 2)]).unwrap();
        assert_eq!(staged.len(), 2);
        assert_eq!(staged[1].sequence, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn tampering_detected() {
        let mut log = EventLog::new();
        let p = ParticipantId::new();
        log.append(deposited(p, 1)).unwrap();
        log.append(deposited(p, 2)).unwrap();
        log.records[0].event = deposited(p, 3);
        let err = log.verify_chain().unwrap_err();
        assert!(matches!(err, EpochvaultError::Internal(_)));
    }

    #[test]
    fn filter_by_participant() {
        let mut log = EventLog::new();
        let alice = ParticipantId::new();
        let bob = ParticipantId::new();
        log.append(deposited(alice, 1)).unwrap();
        log.append(deposited(bob, 2)).unwrap();
        log.append(deposited(alice, 3)).unwrap();
        assert_eq!(log.for_participant(alice).count(), 2);
        assert_eq!(log.for_participant(bob).count(), 1);
    }
}
