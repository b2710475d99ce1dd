pub mod config;

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle, time::Instant};

/// Outcome of [`ConfirmationGate::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First phase: show the pending state, perform nothing yet.
    Armed,
    /// Second phase (or bypass): perform the action now.
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateState {
    pub armed: bool,
    pub expiry: Option<Instant>,
}

impl GateState {
    fn is_armed_at(&self, now: Instant) -> bool {
        self.armed && self.expiry.is_some_and(|expiry| now < expiry)
    }
}

/// Timed two-phase "arm, then confirm" trigger.
///
/// Arming starts a one-shot timer that disarms the gate after the window;
/// the armed flag is also checked against the expiry lazily, so a trigger
/// racing the timer still sees the gate as expired. Must be triggered from
/// within a tokio runtime.
#[derive(Debug)]
pub struct ConfirmationGate {
    window: Duration,
    state: Arc<watch::Sender<GateState>>,
    timer: Option<JoinHandle<()>>,
}

impl ConfirmationGate {
    pub fn new(window: Duration) -> Self {
        let (state, _) = watch::channel(GateState::default());
        ConfirmationGate {
            window,
            state: Arc::new(state),
            timer: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_armed(&self) -> bool {
        self.state.borrow().is_armed_at(Instant::now())
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    pub fn trigger(&mut self, bypass: bool) -> Trigger {
        let now = Instant::now();
        let armed = self.state.borrow().is_armed_at(now);
        if armed || bypass {
            self.disarm();
            return Trigger::Committed;
        }

        let expiry = now + self.window;
        self.cancel_timer();
        self.state.send_replace(GateState {
            armed: true,
            expiry: Some(expiry),
        });

        let state = Arc::clone(&self.state);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(expiry).await;
            state.send_if_modified(|current| {
                if current.armed && current.expiry == Some(expiry) {
                    *current = GateState::default();
                    return true;
                }
                false
            });
        }));
        Trigger::Armed
    }

    fn disarm(&mut self) {
        self.cancel_timer();
        self.state.send_if_modified(|current| {
            let was_armed = current.armed;
            *current = GateState::default();
            was_armed
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ConfirmationGate {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(2000);

    #[tokio::test(start_paused = true)]
    async fn second_trigger_within_window_commits() {
        let mut gate = ConfirmationGate::new(WINDOW);

        assert_eq!(gate.trigger(false), Trigger::Armed);
        assert!(gate.is_armed());

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(gate.trigger(false), Trigger::Committed);
        assert!(!gate.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_gate_arms_again() {
        let mut gate = ConfirmationGate::new(WINDOW);

        assert_eq!(gate.trigger(false), Trigger::Armed);
        tokio::time::advance(WINDOW + Duration::from_millis(1)).await;

        assert!(!gate.is_armed());
        assert_eq!(gate.trigger(false), Trigger::Armed);
    }

    #[tokio::test(start_paused = true)]
    async fn bypass_always_commits() {
        let mut gate = ConfirmationGate::new(WINDOW);
        assert_eq!(gate.trigger(true), Trigger::Committed);
        assert!(!gate.is_armed());

        assert_eq!(gate.trigger(false), Trigger::Armed);
        assert_eq!(gate.trigger(true), Trigger::Committed);
        assert!(!gate.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_publishes_disarm() {
        let mut gate = ConfirmationGate::new(Duration::from_millis(1000));
        let mut rx = gate.subscribe();

        gate.trigger(false);
        assert!(rx.borrow_and_update().armed);

        let state = rx.wait_for(|s| !s.armed).await.unwrap();
        assert_eq!(state.expiry, None);
    }

    #[tokio::test(start_paused = true)]
    async fn arming_sets_expiry_one_window_ahead() {
        let mut gate = ConfirmationGate::new(WINDOW);
        let start = Instant::now();

        gate.trigger(false);

        assert_eq!(gate.subscribe().borrow().expiry, Some(start + WINDOW));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_disarm_a_new_arm() {
        let mut gate = ConfirmationGate::new(WINDOW);

        gate.trigger(false);
        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(gate.trigger(false), Trigger::Committed);
        assert_eq!(gate.trigger(false), Trigger::Armed);

        // past the first arm's expiry, inside the second one's
        tokio::time::advance(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert!(gate.is_armed());
        assert!(gate.subscribe().borrow().armed);
    }
}
