//! # Exchange mailboxes
//!
//! One bounded MPSC mailbox per worker. Senders take the mailbox's send gate
//! (a binary semaphore) for the whole batch, so a batch lands contiguously.
//! Every migrant carries the phase and the worker it left from; the owning
//! [`Inbox`] takes exactly the batch of the phase it is in and parks early
//! arrivals from later phases until their turn.
//!
//! ```ignore
//! let (mailboxes, mut inboxes) = MailboxSet::new(n, capacity);
//! mailboxes.send_batch(0, 1, phase, emigrants)?;
//! let migrants = inboxes[1].collect(phase, 0, k)?;
//! ```

use crate::error::{OrchestrationError, OrchestrationResult};
use crossbeam_channel::{Receiver, Sender, bounded, select};
use mswarm_pso::Particle;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A particle in transit between two workers
#[derive(Debug, Clone)]
pub struct Migrant {
    /// Exchange round it was sent in
    pub phase: usize,
    /// Sending worker
    pub origin: usize,
    pub particle: Particle,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ABORT SIGNAL
// ═══════════════════════════════════════════════════════════════════════════════

/// One-shot broadcast that wakes every blocked send and receive.
///
/// Triggering drops the only sender of a zero-capacity channel, so every
/// `select!` waiting on [`AbortSignal::listener`] becomes ready at once.
#[derive(Debug)]
pub struct AbortSignal {
    trigger: Mutex<Option<Sender<()>>>,
    listener: Receiver<()>,
    triggered: AtomicBool,
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Mutex::new(Some(tx)),
            listener: rx,
            triggered: AtomicBool::new(false),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
        // A poisoned lock still owns the sender; take it anyway
        let mut guard = match self.trigger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Receiver that becomes disconnected once the signal fires
    pub fn listener(&self) -> &Receiver<()> {
        &self.listener
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAILBOXES
// ═══════════════════════════════════════════════════════════════════════════════

/// Sending half of one worker's mailbox
#[derive(Debug)]
pub struct Mailbox {
    gate: Mutex<()>,
    sender: Sender<Migrant>,
    capacity: usize,
}

impl Mailbox {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Migrants currently queued
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Sending halves of every worker's mailbox, shared by all workers
#[derive(Debug)]
pub struct MailboxSet {
    mailboxes: Vec<Mailbox>,
    abort: AbortSignal,
}

impl MailboxSet {
    /// Create `count` mailboxes of `capacity` migrants each, returning the
    /// shared sending side and one [`Inbox`] per worker (index = worker id)
    pub fn new(count: usize, capacity: usize) -> (Self, Vec<Inbox>) {
        let abort = AbortSignal::new();
        let mut mailboxes = Vec::with_capacity(count);
        let mut inboxes = Vec::with_capacity(count);

        for owner in 0..count {
            let (sender, receiver) = bounded(capacity);
            mailboxes.push(Mailbox {
                gate: Mutex::new(()),
                sender,
                capacity,
            });
            inboxes.push(Inbox {
                owner,
                receiver,
                abort: abort.listener().clone(),
                pending: Vec::new(),
            });
        }

        (Self { mailboxes, abort }, inboxes)
    }

    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }

    pub fn mailbox(&self, worker: usize) -> Option<&Mailbox> {
        self.mailboxes.get(worker)
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }

    /// Wake every blocked worker; they return [`OrchestrationError::Aborted`]
    pub fn abort(&self) {
        self.abort.trigger();
    }

    /// Push a batch into `to`'s mailbox while holding its send gate.
    ///
    /// Fire-and-forget: returns once every migrant is queued.
    pub fn send_batch(
        &self,
        from: usize,
        to: usize,
        phase: usize,
        particles: Vec<Particle>,
    ) -> OrchestrationResult<()> {
        let mailbox = self.mailboxes.get(to).ok_or_else(|| OrchestrationError::ProtocolViolation {
            worker: from,
            phase,
            reason: format!("no mailbox for destination {to}"),
        })?;

        let _gate = mailbox.gate.lock()?;
        for particle in particles {
            let migrant = Migrant {
                phase,
                origin: from,
                particle,
            };
            select! {
                send(mailbox.sender, migrant) -> sent => {
                    sent.map_err(|_| OrchestrationError::ProtocolViolation {
                        worker: from,
                        phase,
                        reason: format!("mailbox of worker {to} is disconnected"),
                    })?;
                }
                recv(self.abort.listener()) -> _ => {
                    return Err(OrchestrationError::Aborted { worker: from });
                }
            }
        }
        Ok(())
    }
}

/// Receiving half of one worker's mailbox, owned by that worker
#[derive(Debug)]
pub struct Inbox {
    owner: usize,
    receiver: Receiver<Migrant>,
    abort: Receiver<()>,
    /// Early arrivals from later phases
    pending: Vec<Migrant>,
}

impl Inbox {
    pub fn owner(&self) -> usize {
        self.owner
    }

    /// Migrants parked for later phases
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Block until exactly `count` migrants of `phase` from `expected_origin`
    /// have arrived and return them in send order.
    pub fn collect(
        &mut self,
        phase: usize,
        expected_origin: usize,
        count: usize,
    ) -> OrchestrationResult<Vec<Particle>> {
        let (early, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|m| m.phase == phase);
        self.pending = later;

        if early.len() > count {
            return Err(self.violation(
                phase,
                format!("expected {count} migrants, {} already queued", early.len()),
            ));
        }

        let mut batch = Vec::with_capacity(count);
        for migrant in early {
            batch.push(self.accept(phase, expected_origin, migrant)?);
        }

        while batch.len() < count {
            let migrant = select! {
                recv(self.receiver) -> msg => msg.map_err(|_| {
                    let reason = "mailbox disconnected before the batch completed";
                    self.violation(phase, reason.to_string())
                })?,
                recv(self.abort) -> _ => {
                    return Err(OrchestrationError::Aborted { worker: self.owner });
                }
            };

            if migrant.phase > phase {
                self.pending.push(migrant);
                continue;
            }
            batch.push(self.accept(phase, expected_origin, migrant)?);
        }

        Ok(batch)
    }

    fn accept(
        &self,
        phase: usize,
        expected_origin: usize,
        migrant: Migrant,
    ) -> OrchestrationResult<Particle> {
        if migrant.phase < phase {
            return Err(self.violation(
                phase,
                format!("stale migrant from phase {} (worker {})", migrant.phase, migrant.origin),
            ));
        }
        if migrant.origin != expected_origin {
            return Err(self.violation(
                phase,
                format!(
                    "migrant from worker {}, expected worker {expected_origin}",
                    migrant.origin
                ),
            ));
        }
        Ok(migrant.particle)
    }

    fn violation(&self, phase: usize, reason: String) -> OrchestrationError {
        OrchestrationError::ProtocolViolation {
            worker: self.owner,
            phase,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mswarm_core::Position;
    use mswarm_pso::ParticleId;
    use std::thread;
    use std::time::Duration;

    fn particle(swarm: usize, slot: usize) -> Particle {
        Particle::new(
            ParticleId::new(swarm, slot),
            Position::from([slot as f64, 0.0]),
            Position::zeros(2),
            slot as f64,
        )
    }

    #[test]
    fn test_send_and_collect() {
        let (set, mut inboxes) = MailboxSet::new(2, 4);
        set.send_batch(0, 1, 0, vec![particle(0, 0), particle(0, 1)]).unwrap();
        assert_eq!(set.mailbox(1).unwrap().len(), 2);

        let got = inboxes[1].collect(0, 0, 2).unwrap();
        let ids: Vec<_> = got.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ParticleId::new(0, 0), ParticleId::new(0, 1)]);
        assert!(set.mailbox(1).unwrap().is_empty());
    }

    #[test]
    fn test_later_phase_is_parked() {
        let (set, mut inboxes) = MailboxSet::new(3, 8);
        // worker 1 racing ahead to phase 1, before worker 2's phase 0 batch
        set.send_batch(1, 0, 1, vec![particle(1, 0)]).unwrap();
        set.send_batch(2, 0, 0, vec![particle(2, 0)]).unwrap();

        let phase0 = inboxes[0].collect(0, 2, 1).unwrap();
        assert_eq!(phase0[0].id(), ParticleId::new(2, 0));
        assert_eq!(inboxes[0].pending(), 1);

        let phase1 = inboxes[0].collect(1, 1, 1).unwrap();
        assert_eq!(phase1[0].id(), ParticleId::new(1, 0));
        assert_eq!(inboxes[0].pending(), 0);
    }

    #[test]
    fn test_wrong_origin_is_violation() {
        let (set, mut inboxes) = MailboxSet::new(3, 4);
        set.send_batch(2, 0, 0, vec![particle(2, 0)]).unwrap();
        let err = inboxes[0].collect(0, 1, 1).unwrap_err();
        assert!(matches!(err, OrchestrationError::ProtocolViolation { worker: 0, phase: 0, .. }));
    }

    #[test]
    fn test_stale_migrant_is_violation() {
        let (set, mut inboxes) = MailboxSet::new(2, 4);
        set.send_batch(1, 0, 0, vec![particle(1, 0)]).unwrap();
        let err = inboxes[0].collect(1, 1, 1).unwrap_err();
        assert!(err.to_string().contains("stale migrant"));
    }

    #[test]
    fn test_unknown_destination() {
        let (set, _inboxes) = MailboxSet::new(2, 4);
        assert!(set.send_batch(0, 5, 0, vec![particle(0, 0)]).is_err());
    }

    #[test]
    fn test_collect_blocks_until_batch_arrives() {
        let (set, mut inboxes) = MailboxSet::new(2, 4);
        let mut inbox = inboxes.remove(1);

        thread::scope(|s| {
            let receiver = s.spawn(move || inbox.collect(0, 0, 2));
            thread::sleep(Duration::from_millis(20));
            set.send_batch(0, 1, 0, vec![particle(0, 3), particle(0, 4)]).unwrap();
            let got = receiver.join().unwrap().unwrap();
            assert_eq!(got.len(), 2);
        });
    }

    #[test]
    fn test_abort_wakes_blocked_receiver() {
        let (set, mut inboxes) = MailboxSet::new(2, 4);
        let mut inbox = inboxes.remove(0);

        thread::scope(|s| {
            let receiver = s.spawn(move || inbox.collect(0, 1, 1));
            thread::sleep(Duration::from_millis(20));
            set.abort();
            let err = receiver.join().unwrap().unwrap_err();
            assert_eq!(err, OrchestrationError::Aborted { worker: 0 });
        });
        assert!(set.abort_signal().is_triggered());
    }

    #[test]
    fn test_abort_wakes_blocked_sender() {
        let (set, _inboxes) = MailboxSet::new(1, 1);
        set.send_batch(0, 0, 0, vec![particle(0, 0)]).unwrap();

        thread::scope(|s| {
            let sender = s.spawn(|| set.send_batch(0, 0, 1, vec![particle(0, 1)]));
            thread::sleep(Duration::from_millis(20));
            set.abort();
            assert!(sender.join().unwrap().unwrap_err().is_abort());
        });
    }

    #[test]
    fn test_abort_signal_is_idempotent() {
        let signal = AbortSignal::new();
        assert!(!signal.is_triggered());
        signal.trigger();
        signal.trigger();
        assert!(signal.is_triggered());
        assert!(signal.listener().recv().is_err());
    }
}
