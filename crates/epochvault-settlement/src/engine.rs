//! Settlement engine.
//!
//! Every participant-facing operation follows the same shape:
//! 1. Read the current epoch from the clock
//! 2. Settle reward via the curve (advance checkpoints)
//! 3. Delegate to the issuer / custody collaborators
//! 4. Mutate the registry
//!
//! ## Atomicity
//!
//! An operation either commits in full or leaves no trace. Before running,
//! the engine snapshots the caller's lock collection and takes savepoints on
//! both collaborators. On any error all three are restored and no event is
//! logged. Settlement and issuance always precede the custody transfer-out,
//! so a failed release can be unwound without re-deriving owed reward.
//!
//! ## Settlement
//!
//! `settle_one` pays `reward_range(checkpoint, current)` and moves the
//! checkpoint to `current` unconditionally. A second settlement in the same
//! epoch therefore owes exactly zero; no separate "already settled" flag is
//! kept.

use epochvault_accrual::{EpochClock, RewardCurve};
use epochvault_custody::{CustodyTransfer, Issuance, TickSource};
use epochvault_types::{
    constants, Amount, AssetId, EpochId, EpochvaultError, LedgerConfig, LedgerEvent, LockRecord,
    ParticipantId, Result, Tick,
};

use crate::event_log::EventLog;
use crate::registry::LockRegistry;

/// Orchestrates clock, curve and registry against the external collaborators.
///
/// Mutating operations take `&mut self`, so a collaborator can never call
/// back into the engine mid-operation.
pub struct SettlementEngine<C, I, T>
where
    C: CustodyTransfer,
    I: Issuance,
    T: TickSource,
{
    config: LedgerConfig,
    clock: EpochClock,
    curve: RewardCurve,
    registry: LockRegistry,
    custody: C,
    issuer: I,
    ticks: T,
    events: EventLog,
}

impl<C, I, T> SettlementEngine<C, I, T>
where
    C: CustodyTransfer,
    I: Issuance,
    T: TickSource,
{
    /// Start an engine. The clock is anchored at `ticks.now()`.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid or a collaborator's identity
    /// differs from the configured one.
    pub fn new(config: LedgerConfig, custody: C, issuer: I, ticks: T) -> Result<Self> {
        config.validate()?;
        if custody.id() != config.custody_id {
            return Err(EpochvaultError::Configuration(format!(
                "custody collaborator is {}, expected {}",
                custody.id(),
                config.custody_id
            )));
        }
        if issuer.id() != config.issuer_id {
            return Err(EpochvaultError::Configuration(format!(
                "issuance collaborator is {}, expected {}",
                issuer.id(),
                config.issuer_id
            )));
        }

        let anchor_tick = ticks.now();
        let clock = EpochClock::new(anchor_tick, config.epoch_length)?;
        let curve = RewardCurve::new(config.start_amount, config.decrease_rate);

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            anchor_tick,
            epoch_length = config.epoch_length,
            start_amount = config.start_amount,
            decrease_rate = config.decrease_rate,
            zero_epoch = ?curve.zero_epoch(),
            "Settlement engine started"
        );

        Ok(Self {
            config,
            clock,
            curve,
            registry: LockRegistry::new(),
            custody,
            issuer,
            ticks,
            events: EventLog::new(),
        })
    }

    /// Replace the (empty) registry with a pre-populated one.
    ///
    /// # Errors
    /// - `InvalidIdentifier` if an injected lock's asset is outside the compact range
    /// - `Internal` if a checkpoint is before its lock epoch or after the current epoch
    /// - `DuplicateAsset` if a participant's collection repeats an asset
    pub fn with_registry(mut self, registry: LockRegistry) -> Result<Self> {
        let current = self.current_epoch();
        for (participant, locks) in registry.iter() {
            for (i, lock) in locks.iter().enumerate() {
                lock.asset_id.ensure_compact()?;
                if lock.checkpoint_epoch > current {
                    return Err(EpochvaultError::Internal(format!(
                        "{} for {participant} is checkpointed at {}, past current {current}",
                        lock.asset_id, lock.checkpoint_epoch
                    )));
                }
                if lock.checkpoint_epoch < lock.lock_epoch {
                    return Err(EpochvaultError::Internal(format!(
                        "{} for {participant} has checkpoint before lock epoch",
                        lock.asset_id
                    )));
                }
                if locks[..i].iter().any(|l| l.asset_id == lock.asset_id) {
                    return Err(EpochvaultError::DuplicateAsset {
                        participant: *participant,
                        asset_id: lock.asset_id,
                    });
                }
            }
        }
        self.registry = registry;
        Ok(self)
    }

    // -----------------------------------------------------------------
    // Participant-facing operations
    // -----------------------------------------------------------------

    /// Take `asset_id` into custody and start accruing reward for it.
    ///
    /// # Errors
    /// - `InvalidIdentifier` if `asset_id >= 2^192`
    /// - `DuplicateAsset` if the caller already has it locked
    /// - `CustodyRejected` if custody refuses the transfer
    pub fn deposit(&mut self, caller: ParticipantId, asset_id: AssetId) -> Result<LockRecord> {
        let asset_id = asset_id.ensure_compact().inspect_err(|_| {
            tracing::warn!(
                participant = %caller,
                asset = %asset_id,
                "Deposit rejected: identifier outside compact range"
            );
        })?;

        let lock = self.atomically(caller, "deposit", |engine, events| {
            if engine.registry.contains(caller, asset_id) {
                return Err(EpochvaultError::DuplicateAsset {
                    participant: caller,
                    asset_id,
                });
            }
            engine.custody.transfer_in(caller, asset_id)?;
            let epoch = engine.current_epoch();
            let index = engine.registry.append(caller, asset_id, epoch)?;
            events.push(LedgerEvent::Deposited {
                participant: caller,
                asset_id,
                epoch,
            });
            engine.registry.get(caller, index).copied()
        })?;

        tracing::info!(
            participant = %caller,
            asset = %asset_id,
            epoch = lock.lock_epoch.0,
            "Asset deposited"
        );
        Ok(lock)
    }

    /// Settle every lock the caller holds and issue the total in one call.
    ///
    /// A `Claimed` event is logged even when the total is zero. No issuance
    /// call is made for a zero total.
    pub fn claim_all(&mut self, caller: ParticipantId) -> Result<Amount> {
        let (total, epoch, locks) = self.atomically(caller, "claim_all", |engine, events| {
            let current = engine.current_epoch();
            let lock_count = engine.registry.lock_count(caller);
            let mut total: Amount = 0;
            for index in 0..lock_count {
                let from = engine.registry.get(caller, index)?.checkpoint_epoch;
                let owed = engine.settle_one(caller, index, current)?;
                total = total
                    .checked_add(owed)
                    .ok_or(EpochvaultError::RewardOverflow {
                        start: from,
                        end: current,
                    })?;
            }
            engine.issue_reward(caller, total)?;
            events.push(LedgerEvent::Claimed {
                participant: caller,
                amount: total,
                epoch: current,
            });
            Ok((total, current, lock_count))
        })?;

        tracing::info!(
            participant = %caller,
            amount = total,
            epoch = epoch.0,
            locks,
            "Rewards claimed"
        );
        Ok(total)
    }

    /// Final-settle `asset_id`, return it to the caller, and drop its lock.
    ///
    /// Returns the reward issued by the final settlement (zero if the lock
    /// was already settled through the current epoch).
    ///
    /// # Errors
    /// - `NotFound` if the caller holds no lock for `asset_id`
    /// - `HoldingPeriodNotElapsed` unless at least one epoch boundary has
    ///   passed since deposit
    /// - `Unauthorized` / `CustodyRejected` from the collaborators
    pub fn withdraw(&mut self, caller: ParticipantId, asset_id: AssetId) -> Result<Amount> {
        let (paid, epoch) = self.atomically(caller, "withdraw", |engine, events| {
            let current = engine.current_epoch();
            let index = engine.registry.find_index(caller, asset_id)?;
            let lock = *engine.registry.get(caller, index)?;
            if !lock.holding_period_elapsed(current) {
                return Err(EpochvaultError::HoldingPeriodNotElapsed {
                    lock_epoch: lock.lock_epoch,
                    current,
                });
            }

            let mut paid: Amount = 0;
            if lock.has_unsettled(current) {
                paid = engine.settle_one(caller, index, current)?;
                engine.issue_reward(caller, paid)?;
                events.push(LedgerEvent::Claimed {
                    participant: caller,
                    amount: paid,
                    epoch: current,
                });
            }

            engine.custody.transfer_out(caller, asset_id)?;
            engine.registry.remove_at(caller, index)?;
            events.push(LedgerEvent::Withdrawn {
                participant: caller,
                asset_id,
                epoch: current,
            });
            Ok((paid, current))
        })?;

        tracing::info!(
            participant = %caller,
            asset = %asset_id,
            amount = paid,
            epoch = epoch.0,
            "Asset withdrawn"
        );
        Ok(paid)
    }

    // -----------------------------------------------------------------
    // Read-only queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn epoch_at(&self, tick: Tick) -> EpochId {
        self.clock.epoch_at(tick)
    }

    #[must_use]
    pub fn current_epoch(&self) -> EpochId {
        self.clock.epoch_at(self.ticks.now())
    }

    #[must_use]
    pub fn reward_at(&self, epoch: EpochId) -> Amount {
        self.curve.reward_at(epoch)
    }

    pub fn reward_range(&self, start: EpochId, end: EpochId) -> Result<Amount> {
        self.curve.reward_range(start, end)
    }

    /// Locks in registry order. Positions change on withdrawal.
    #[must_use]
    pub fn locks_of(&self, participant: ParticipantId) -> &[LockRecord] {
        self.registry.locks_of(participant)
    }

    /// What [`Self::claim_all`] would issue right now.
    pub fn pending_reward(&self, participant: ParticipantId) -> Result<Amount> {
        let current = self.current_epoch();
        self.registry
            .locks_of(participant)
            .iter()
            .try_fold(0u128, |acc, lock| {
                let owed = self.curve.reward_range(lock.checkpoint_epoch, current)?;
                acc.checked_add(owed).ok_or(EpochvaultError::RewardOverflow {
                    start: lock.checkpoint_epoch,
                    end: current,
                })
            })
    }

    /// Unsettled reward for one lock.
    pub fn pending_reward_for(&self, participant: ParticipantId, asset_id: AssetId) -> Result<Amount> {
        let index = self.registry.find_index(participant, asset_id)?;
        let lock = self.registry.get(participant, index)?;
        self.curve
            .reward_range(lock.checkpoint_epoch, self.current_epoch())
    }

    /// First epoch in which `asset_id` may be withdrawn.
    pub fn withdrawable_at(&self, participant: ParticipantId, asset_id: AssetId) -> Result<EpochId> {
        let index = self.registry.find_index(participant, asset_id)?;
        Ok(self.registry.get(participant, index)?.withdrawable_from())
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    #[must_use]
    pub fn curve(&self) -> &RewardCurve {
        &self.curve
    }

    #[must_use]
    pub fn registry(&self) -> &LockRegistry {
        &self.registry
    }

    #[must_use]
    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Host access to the custody collaborator (e.g. to register assets).
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    #[must_use]
    pub fn issuer(&self) -> &I {
        &self.issuer
    }

    /// Host access to the issuance collaborator (e.g. to grant mint authority).
    pub fn issuer_mut(&mut self) -> &mut I {
        &mut self.issuer
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Settle one lock through `current`. Returns the owed amount; does not issue.
    fn settle_one(
        &mut self,
        participant: ParticipantId,
        index: usize,
        current: EpochId,
    ) -> Result<Amount> {
        let lock = self.registry.get_mut(participant, index)?;
        let from = lock.checkpoint_epoch;
        let owed = self.curve.reward_range(from, current)?;
        lock.checkpoint_epoch = current;

        tracing::debug!(
            participant = %participant,
            asset = %lock.asset_id,
            checkpoint_from = from.0,
            checkpoint_to = current.0,
            owed,
            "Lock settled"
        );
        Ok(owed)
    }

    fn issue_reward(&mut self, to: ParticipantId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.issuer.issue(self.config.engine_id, to, amount)
    }

    /// Run `op` as one all-or-nothing unit touching `participant`'s locks.
    fn atomically<R>(
        &mut self,
        participant: ParticipantId,
        operation: &'static str,
        op: impl FnOnce(&mut Self, &mut Vec<LedgerEvent>) -> Result<R>,
    ) -> Result<R> {
        let locks_before = self.registry.snapshot(participant);
        let custody_sp = self.custody.savepoint();
        let issuer_sp = self.issuer.savepoint();
        let mut pending = Vec::new();

        let outcome = op(self, &mut pending)
            .and_then(|value| Ok((value, self.events.stage(&pending)?)));

        match outcome {
            Ok((value, staged)) => {
                self.events.extend(staged);
                self.custody.commit();
                self.issuer.commit();
                Ok(value)
            }
            Err(err) => {
                self.registry.restore(participant, locks_before);
                self.custody.rollback_to(custody_sp);
                self.issuer.rollback_to(issuer_sp);
                tracing::warn!(
                    participant = %participant,
                    operation,
                    error = %err,
                    "Operation aborted; state rolled back"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epochvault_custody::{CustodyVault, Holder, Journaled, ManualTicks, RewardIssuer};
    use epochvault_types::CollaboratorId;

    type Engine = SettlementEngine<CustodyVault, RewardIssuer, ManualTicks>;

    /// Engine anchored at tick 10 with the reference curve, plus the host's tick handle.
    fn setup() -> (Engine, ManualTicks) {
        setup_with(LedgerConfig::reference())
    }

    fn setup_with(config: LedgerConfig) -> (Engine, ManualTicks) {
        let custody = CustodyVault::new(config.custody_id);
        let mut issuer = RewardIssuer::new(config.issuer_id);
        issuer.authorize_minter(config.engine_id);
        let ticks = ManualTicks::new(10);
        let engine = SettlementEngine::new(config, custody, issuer, ticks.clone()).unwrap();
        (engine, ticks)
    }

    fn give(engine: &mut Engine, owner: ParticipantId, n: u128) -> AssetId {
        let asset = AssetId::from_u128(n);
        engine.custody_mut().register_asset(owner, asset).unwrap();
        engine.custody_mut().commit();
        asset
    }

    fn to_epoch(ticks: &ManualTicks, epoch: u64) {
        ticks.set(10 + epoch * 300);
    }

    #[test]
    fn rejects_mismatched_collaborators() {
        let config = LedgerConfig::reference();
        let result = SettlementEngine::new(
            config.clone(),
            CustodyVault::new(CollaboratorId::new()),
            RewardIssuer::new(config.issuer_id),
            ManualTicks::new(0),
        );
        assert!(matches!(result, Err(EpochvaultError::Configuration(_))));

        let result = SettlementEngine::new(
            config.clone(),
            CustodyVault::new(config.custody_id),
            RewardIssuer::new(CollaboratorId::new()),
            ManualTicks::new(0),
        );
        assert!(matches!(result, Err(EpochvaultError::Configuration(_))));
    }

    #[test]
    fn clock_is_anchored_at_start_tick() {
        let (engine, ticks) = setup();
        assert_eq!(engine.clock().anchor_tick(), 10);
        assert_eq!(engine.current_epoch(), EpochId(0));
        ticks.set(310);
        assert_eq!(engine.current_epoch(), EpochId(1));
        assert_eq!(engine.epoch_at(5), EpochId(0));
    }

    #[test]
    fn settle_one_is_idempotent_within_an_epoch() {
        let (mut engine, ticks) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        engine.deposit(alice, a).unwrap();

        to_epoch(&ticks, 2);
        assert_eq!(engine.settle_one(alice, 0, EpochId(2)).unwrap(), 19_900);
        assert_eq!(engine.settle_one(alice, 0, EpochId(2)).unwrap(), 0);
        assert_eq!(engine.locks_of(alice)[0].checkpoint_epoch, EpochId(2));
    }

    #[test]
    fn settle_one_advances_checkpoint_even_when_nothing_is_owed() {
        let (mut engine, ticks) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        to_epoch(&ticks, 150);
        engine.deposit(alice, a).unwrap();
        assert_eq!(engine.settle_one(alice, 0, EpochId(160)).unwrap(), 0);
        assert_eq!(engine.locks_of(alice)[0].checkpoint_epoch, EpochId(160));
    }

    #[test]
    fn deposit_creates_lock_and_moves_asset() {
        let (mut engine, ticks) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        to_epoch(&ticks, 3);
        let lock = engine.deposit(alice, a).unwrap();
        assert_eq!(lock, LockRecord::new(a, EpochId(3)));
        assert_eq!(engine.custody().holder_of(&a), Some(Holder::Vault));
        assert_eq!(engine.events().len(), 1);
    }

    #[test]
    fn deposit_of_unowned_asset_leaves_no_trace() {
        let (mut engine, _) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, ParticipantId::new(), 1);
        let err = engine.deposit(alice, a).unwrap_err();
        assert!(matches!(err, EpochvaultError::CustodyRejected { .. }));
        assert!(engine.locks_of(alice).is_empty());
        assert!(engine.events().is_empty());
    }

    #[test]
    fn claim_with_no_locks_is_zero() {
        let (mut engine, _) = setup();
        let alice = ParticipantId::new();
        assert_eq!(engine.claim_all(alice).unwrap(), 0);
        assert_eq!(engine.issuer().total_supply(), 0);
        assert!(matches!(
            engine.events().records()[0].event,
            LedgerEvent::Claimed { amount: 0, .. }
        ));
    }

    #[test]
    fn unauthorized_engine_rolls_back_checkpoints() {
        let (mut engine, ticks) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        engine.deposit(alice, a).unwrap();
        let engine_id = engine.config().engine_id;
        assert!(engine.issuer_mut().revoke_minter(engine_id));

        to_epoch(&ticks, 4);
        let err = engine.claim_all(alice).unwrap_err();
        assert_eq!(err, EpochvaultError::Unauthorized { minter: engine_id });
        assert_eq!(engine.locks_of(alice)[0].checkpoint_epoch, EpochId(0));
        assert_eq!(engine.events().len(), 1);
    }

    #[test]
    fn pending_reward_matches_claim() {
        let (mut engine, ticks) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        let b = give(&mut engine, alice, 2);
        engine.deposit(alice, a).unwrap();
        to_epoch(&ticks, 2);
        engine.deposit(alice, b).unwrap();
        to_epoch(&ticks, 5);

        let pending = engine.pending_reward(alice).unwrap();
        assert_eq!(
            engine.pending_reward_for(alice, b).unwrap(),
            engine.reward_range(EpochId(2), EpochId(5)).unwrap()
        );
        assert_eq!(engine.claim_all(alice).unwrap(), pending);
        assert_eq!(engine.pending_reward(alice).unwrap(), 0);
    }

    #[test]
    fn withdrawable_at_is_next_epoch() {
        let (mut engine, ticks) = setup();
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        to_epoch(&ticks, 7);
        engine.deposit(alice, a).unwrap();
        assert_eq!(engine.withdrawable_at(alice, a).unwrap(), EpochId(8));
        assert!(engine.withdrawable_at(alice, AssetId::from_u128(9)).is_err());
    }

    #[test]
    fn injected_registry_is_used() {
        let (engine, ticks) = setup();
        let alice = ParticipantId::new();
        let mut registry = LockRegistry::new();
        registry.append(alice, AssetId::from_u128(1), EpochId(0)).unwrap();
        let engine = engine.with_registry(registry).unwrap();
        to_epoch(&ticks, 1);
        assert_eq!(engine.pending_reward(alice).unwrap(), 10_000);
    }

    #[test]
    fn injected_registry_with_broken_checkpoint_rejected() {
        let (engine, ticks) = setup();
        to_epoch(&ticks, 6);
        let alice = ParticipantId::new();
        let mut registry = LockRegistry::new();
        registry.append(alice, AssetId::from_u128(1), EpochId(5)).unwrap();
        registry.get_mut(alice, 0).unwrap().checkpoint_epoch = EpochId(4);
        assert!(matches!(
            engine.with_registry(registry),
            Err(EpochvaultError::Internal(_))
        ));
    }

    #[test]
    fn injected_registry_with_future_checkpoint_rejected() {
        let (engine, ticks) = setup();
        to_epoch(&ticks, 5);
        let alice = ParticipantId::new();
        let mut registry = LockRegistry::new();
        registry.append(alice, AssetId::from_u128(1), EpochId(0)).unwrap();
        registry.append(alice, AssetId::from_u128(2), EpochId(0)).unwrap();
        registry.get_mut(alice, 1).unwrap().checkpoint_epoch = EpochId(50);
        assert!(matches!(
            engine.with_registry(registry),
            Err(EpochvaultError::Internal(_))
        ));
    }

    #[test]
    fn injected_registry_with_non_compact_asset_rejected() {
        let (engine, _) = setup();
        let alice = ParticipantId::new();
        let mut registry = LockRegistry::new();
        registry.append(alice, AssetId::compact_bound(), EpochId(0)).unwrap();
        assert!(matches!(
            engine.with_registry(registry),
            Err(EpochvaultError::InvalidIdentifier(id)) if id == AssetId::compact_bound()
        ));
    }

    #[test]
    fn claim_overflow_reports_the_overflowing_lock_range() {
        let (mut engine, ticks) = setup_with(LedgerConfig::new(300, u128::MAX / 2 + 1, 0));
        let alice = ParticipantId::new();
        let a = give(&mut engine, alice, 1);
        let b = give(&mut engine, alice, 2);
        to_epoch(&ticks, 2);
        engine.deposit(alice, a).unwrap();
        engine.deposit(alice, b).unwrap();
        to_epoch(&ticks, 3);

        let expected = EpochvaultError::RewardOverflow {
            start: EpochId(2),
            end: EpochId(3),
        };
        assert_eq!(engine.pending_reward(alice).unwrap_err(), expected);
        assert_eq!(engine.claim_all(alice).unwrap_err(), expected);
        assert!(
            engine
                .locks_of(alice)
                .iter()
                .all(|l| l.checkpoint_epoch == EpochId(2))
        );
    }
}
