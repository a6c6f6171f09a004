use crate::knowledge::UniverseId;

/// Delays child expansion after entering a universe while the camera flies in.
///
/// Re-arming or cancelling drops the pending deadline, so a timer started for one
/// universe can never mark another one ready.
#[derive(Clone, Debug, Default)]
pub struct SettleTimer {
    pending: Option<(UniverseId, f64)>,
    ready: Option<UniverseId>,
}

impl SettleTimer {
    pub fn arm(&mut self, universe: UniverseId, now: f64, delay_secs: f64) {
        self.cancel();
        self.pending = Some((universe, now + delay_secs.max(0.0)));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.ready = None;
    }

    /// Returns true on the tick the pending deadline elapses.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.pending {
            Some((universe, deadline)) if now >= deadline => {
                self.pending = None;
                self.ready = Some(universe);
                tracing::debug!(universe = universe.key(), "universe settled");
                true
            }
            _ => false,
        }
    }

    pub fn is_ready(&self, universe: UniverseId) -> bool {
        self.ready == Some(universe)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn becomes_ready_after_delay() {
        let mut timer = SettleTimer::default();
        timer.arm(UniverseId::KnowledgeVerse, 10.0, 1.5);

        assert!(!timer.poll(11.0));
        assert!(!timer.is_ready(UniverseId::KnowledgeVerse));
        assert!(timer.poll(11.5));
        assert!(timer.is_ready(UniverseId::KnowledgeVerse));
        assert!(!timer.poll(20.0));
    }

    #[test]
    fn switching_again_cancels_the_stale_timer() {
        let mut timer = SettleTimer::default();
        timer.arm(UniverseId::KnowledgeVerse, 0.0, 1.5);
        timer.arm(UniverseId::ProfileVerse, 1.0, 1.5);

        // The first deadline passes without marking anything ready.
        assert!(!timer.poll(1.6));
        assert!(!timer.is_ready(UniverseId::KnowledgeVerse));
        assert!(!timer.is_ready(UniverseId::ProfileVerse));

        assert!(timer.poll(2.5));
        assert!(timer.is_ready(UniverseId::ProfileVerse));
        assert!(!timer.is_ready(UniverseId::KnowledgeVerse));
    }

    #[test]
    fn rearming_clears_readiness() {
        let mut timer = SettleTimer::default();
        timer.arm(UniverseId::DevVerse, 0.0, 1.0);
        timer.poll(1.0);
        assert!(timer.is_ready(UniverseId::DevVerse));

        timer.arm(UniverseId::DevVerse, 5.0, 1.0);
        assert!(!timer.is_ready(UniverseId::DevVerse));

        timer.cancel();
        assert!(!timer.poll(100.0));
        assert!(!timer.is_pending());
    }
}
