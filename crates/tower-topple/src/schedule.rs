//! Deferred messages.
//!
//! Timers are not threads: they are messages queued against simulation time
//! and handed back to the coordinator by [`Schedule::advance`]. Each carries
//! the round it was scheduled for so a reset can invalidate it.

/// Generation counter of the current round. Bumped on every reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundToken(pub u64);

impl RoundToken {
    pub fn next(self) -> Self {
        RoundToken(self.0 + 1)
    }
}

/// Work the coordinator puts off until later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Let the stack fall and hand out the first projectile.
    Activate,
    /// Hand out the next projectile, or start the grace period.
    Settle,
    /// Decide the round.
    Verdict,
}

/// A message whose deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub round: RoundToken,
    pub message: Deferred,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: f64,
    seq: u64,
    fired: Fired,
}

/// Deadline queue over accumulated simulation time.
#[derive(Debug, Default)]
pub struct Schedule {
    now: f64,
    seq: u64,
    pending: Vec<Pending>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation time seen so far, in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Queue `message` for `delay` seconds from now.
    pub fn after(&mut self, delay: f32, round: RoundToken, message: Deferred) {
        self.seq += 1;
        self.pending.push(Pending {
            due: self.now + delay.max(0.0) as f64,
            seq: self.seq,
            fired: Fired { round, message },
        });
    }

    /// Advance the clock and return every message now due, earliest deadline
    /// first, in scheduling order on ties.
    pub fn advance(&mut self, dt: f32) -> Vec<Fired> {
        self.now += dt.max(0.0) as f64;
        let now = self.now;

        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.fired).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R0: RoundToken = RoundToken(0);

    #[test]
    fn nothing_fires_early() {
        let mut schedule = Schedule::new();
        schedule.after(0.5, R0, Deferred::Activate);
        assert!(schedule.advance(0.25).is_empty());
        assert_eq!(schedule.len(), 1);
        assert_eq!(
            schedule.advance(0.25),
            vec![Fired { round: R0, message: Deferred::Activate }]
        );
        assert!(schedule.is_empty());
    }

    #[test]
    fn fires_in_deadline_order_then_fifo() {
        let mut schedule = Schedule::new();
        schedule.after(1.0, R0, Deferred::Verdict);
        schedule.after(0.5, R0, Deferred::Settle);
        schedule.after(0.5, RoundToken(1), Deferred::Activate);

        let fired: Vec<Deferred> = schedule.advance(2.0).into_iter().map(|f| f.message).collect();
        assert_eq!(fired, vec![Deferred::Settle, Deferred::Activate, Deferred::Verdict]);
    }

    #[test]
    fn delays_count_from_the_current_time() {
        let mut schedule = Schedule::new();
        schedule.advance(10.0);
        schedule.after(1.0, R0, Deferred::Settle);
        assert!(schedule.advance(0.75).is_empty());
        assert_eq!(schedule.advance(0.25).len(), 1);
        assert!((schedule.now() - 11.0).abs() < 1e-6);
    }

    #[test]
    fn tokens_advance() {
        assert_eq!(R0.next(), RoundToken(1));
        assert_ne!(R0.next(), R0);
    }
}
