//! Score, level and countdown of one play session, plus the delayed transitions between
//! rounds. Holds no layout or round data: the game systems ask the engines for those.

use core::time::Duration;

use bevy::prelude::{Resource, Timer, TimerMode};
use tracing::info;

use crate::round::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRules {
    /// Length of a session
    pub duration: Duration,
    /// Levels stop increasing here
    pub max_level: u32,
    /// Remaining seconds at which the countdown is shown as a warning
    pub warning_threshold: u32,
    /// Pause between a correct tap and the next round
    pub next_round_delay: Duration,
    /// Pause between the end of a session and a fresh one
    pub new_session_delay: Duration,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(120),
            max_level: 5,
            warning_threshold: 15,
            next_round_delay: Duration::from_secs(1),
            new_session_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Level up (up to the cap) and generate a new round
    NextRound,
    /// Throw the session away and start over
    NewSession,
}

#[derive(Debug)]
struct PendingTransition {
    timer: Timer,
    transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Correct,
    Wrong,
    Ignored,
}

/// What happened during one [`Session::tick`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// The countdown ran out on this tick
    pub expired: bool,
    pub fired: Vec<Transition>,
}

#[derive(Resource, Debug)]
pub struct Session {
    rules: SessionRules,
    score: u32,
    level: u32,
    countdown: Timer,
    running: bool,
    accepting_input: bool,
    pending: Vec<PendingTransition>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionRules::default())
    }
}

impl Session {
    pub fn new(rules: SessionRules) -> Self {
        Self {
            countdown: Timer::new(rules.duration, TimerMode::Once),
            rules,
            score: 0,
            level: 1,
            running: true,
            accepting_input: false,
            pending: Vec::new(),
        }
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn accepts_input(&self) -> bool {
        self.running && self.accepting_input
    }

    pub const fn rules(&self) -> &SessionRules {
        &self.rules
    }

    /// Whole seconds left, rounded up.
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs().ceil() as u32
    }

    pub fn is_time_warning(&self) -> bool {
        self.remaining_secs() <= self.rules.warning_threshold
    }

    pub fn has_pending(&self, transition: Transition) -> bool {
        self.pending
            .iter()
            .any(|pending| pending.transition == transition)
    }

    /// A new round is on screen, taps count again.
    pub fn begin_round(&mut self) {
        self.accepting_input = self.running;
    }

    /// Applies a tap on a slot with the given role (`None` for a hidden slot).
    pub fn resolve_tap(&mut self, role: Option<Role>) -> TapOutcome {
        if !self.accepts_input() {
            return TapOutcome::Ignored;
        }
        match role {
            Some(Role::Correct) => {
                self.score = self.score.saturating_add(1);
                self.accepting_input = false;
                self.schedule(Transition::NextRound, self.rules.next_round_delay);
                TapOutcome::Correct
            }
            Some(Role::Wrong) => {
                self.score = self.score.saturating_sub(1);
                TapOutcome::Wrong
            }
            None => TapOutcome::Ignored,
        }
    }

    /// Increases the level unless it already reached the cap. Returns the new level.
    pub fn advance_level(&mut self) -> u32 {
        if self.level < self.rules.max_level {
            self.level += 1;
            info!("Level up: {}", self.level);
        }
        self.level
    }

    /// Advances the countdown and the pending transitions.
    ///
    /// The countdown starts with the first tick of the session. When it runs out, taps stop
    /// counting, a pending next round is dropped and a new session is scheduled.
    pub fn tick(&mut self, delta: Duration) -> SessionUpdate {
        let mut update = SessionUpdate::default();

        if self.running && self.countdown.tick(delta).finished() {
            info!("Session over with score {}", self.score);
            self.running = false;
            self.accepting_input = false;
            self.pending
                .retain(|pending| pending.transition != Transition::NextRound);
            update.expired = true;
        }

        for pending in &mut self.pending {
            pending.timer.tick(delta);
        }
        self.pending.retain(|pending| {
            if pending.timer.finished() {
                update.fired.push(pending.transition);
                false
            } else {
                true
            }
        });

        if update.expired {
            self.schedule(Transition::NewSession, self.rules.new_session_delay);
        }

        update
    }

    /// Stops the session for good: nothing is scheduled afterwards.
    pub fn end(&mut self) {
        self.running = false;
        self.accepting_input = false;
        self.cancel_pending();
    }

    pub fn cancel_pending(&mut self) {
        if !self.pending.is_empty() {
            info!("Cancelling {} pending transitions", self.pending.len());
        }
        self.pending.clear();
    }

    /// Back to score 0, level 1 and a full countdown, keeping the rules.
    pub fn reset(&mut self) {
        *self = Self::new(self.rules.clone());
    }

    fn schedule(&mut self, transition: Transition, delay: Duration) {
        self.pending.push(PendingTransition {
            timer: Timer::new(delay, TimerMode::Once),
            transition,
        });
    }
}
