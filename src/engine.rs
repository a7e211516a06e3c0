use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::EngineError;
use crate::session::{check_level, Feedback, Phase, SessionConfig, SessionState};
use crate::stimulus::{Alphabet, RandomStimuli, Stimulus, StimulusSource};

/// Periodic stimulus timer. Dropping it disarms it.
#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    next_due: Instant,
}

impl Timer {
    fn arm(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Consume at most one due firing. Falling more than an interval
    /// behind re-anchors the schedule on `now`.
    fn take_due(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }
}

/// What the stimulus disc shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscContent {
    Start,
    Stimulus(Stimulus),
    Score(i32),
}

/// The n-back session engine: owns all session state and its timer
#[derive(Debug)]
pub struct Engine {
    config: SessionConfig,
    alphabet: Alphabet,
    source: Box<dyn StimulusSource>,
    state: SessionState,
    timer: Option<Timer>,
}

impl Engine {
    pub fn new(
        config: SessionConfig,
        alphabet: Alphabet,
        mut source: Box<dyn StimulusSource>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let seed = source.next(&alphabet);
        Ok(Self {
            config,
            alphabet,
            source,
            state: SessionState::seeded(seed),
            timer: None,
        })
    }

    /// Engine drawing uniformly at random, reproducibly when `seed` is given
    pub fn random(
        config: SessionConfig,
        alphabet: Alphabet,
        seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        let source = match seed {
            Some(seed) => RandomStimuli::seeded(seed),
            None => RandomStimuli::new(),
        };
        Self::new(config, alphabet, Box::new(source))
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Begin a fresh run at the current level with the first firing due
    /// one interval after `now`. Any previously armed timer is dropped first.
    pub fn start_at(&mut self, now: Instant) {
        self.timer = None;

        self.state.tick = 0;
        self.state.score = 0;
        self.state.feedback = Feedback::None;
        self.state.clear_history();
        self.state.phase = Phase::Running;
        info!(level = self.config.level, max_ticks = self.config.max_ticks, "session started");

        self.emit_tick();
        if self.state.phase == Phase::Running {
            self.timer = Some(Timer::arm(now, self.config.tick_interval));
        }
    }

    /// One stimulus step. The step after the last stimulus finishes the run
    /// instead of emitting, so the final stimulus stays answerable for a full
    /// interval. `Running` with `tick == max_ticks` is therefore a normal state
    /// until that next firing.
    pub fn emit_tick(&mut self) {
        if self.state.phase != Phase::Running {
            return;
        }
        if self.state.tick >= self.config.max_ticks {
            self.finish();
            return;
        }

        let s = self.source.next(&self.alphabet);
        self.state.push(s);
        self.state.tick += 1;
        self.state.feedback = Feedback::None;
        debug!(tick = self.state.tick, stimulus = %s, "stimulus emitted");
    }

    fn finish(&mut self) {
        self.timer = None;
        self.state.phase = Phase::Finished;
        info!(score = self.state.score, ticks = self.state.tick, "session finished");
    }

    /// Fire the timer if it is due at `now`. Returns whether it fired.
    pub fn advance(&mut self, now: Instant) -> bool {
        let due = match self.timer.as_mut() {
            Some(timer) => timer.take_due(now),
            None => false,
        };
        if due {
            self.emit_tick();
        }
        due
    }

    /// Fire the armed timer regardless of its deadline; no-op when disarmed
    pub fn fire_timer(&mut self) -> bool {
        if self.timer.is_none() {
            return false;
        }
        self.emit_tick();
        true
    }

    pub fn submit_guess(&mut self) -> Result<Feedback, EngineError> {
        if self.state.phase != Phase::Running {
            return Err(EngineError::NotRunning(self.state.phase));
        }

        let feedback = if self.state.matches_back(self.config.level) {
            self.state.score += 1;
            Feedback::Correct
        } else {
            self.state.score -= 1;
            Feedback::Wrong
        };
        self.state.feedback = feedback;
        debug!(tick = self.state.tick, %feedback, score = self.state.score, "guess");
        Ok(feedback)
    }

    pub fn set_level(&mut self, level: usize) -> Result<(), EngineError> {
        let level = check_level(level)?;
        self.config.level = level;
        self.reset();
        info!(level, "level set");
        Ok(())
    }

    /// Back to Idle at the current level
    pub fn restart(&mut self) {
        self.reset();
        info!(level = self.config.level, "session reset");
    }

    fn reset(&mut self) {
        self.timer = None;
        let seed = self.source.next(&self.alphabet);
        self.state = SessionState::seeded(seed);
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn level(&self) -> usize {
        self.config.level
    }

    pub fn tick(&self) -> u32 {
        self.state.tick
    }

    pub fn score(&self) -> i32 {
        self.state.score
    }

    pub fn feedback(&self) -> Feedback {
        self.state.feedback
    }

    pub fn history(&self) -> impl Iterator<Item = Stimulus> + '_ {
        self.state.history().iter().copied()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn current_stimulus(&self) -> Option<Stimulus> {
        match self.state.phase {
            Phase::Running => self.state.history().front().copied(),
            _ => None,
        }
    }

    pub fn disc(&self) -> DiscContent {
        match self.state.phase {
            Phase::Idle => DiscContent::Start,
            Phase::Running => self
                .current_stimulus()
                .map_or(DiscContent::Start, DiscContent::Stimulus),
            Phase::Finished => DiscContent::Score(self.state.score),
        }
    }

    /// Fraction of the run already presented, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        (f64::from(self.state.tick) / f64::from(self.config.max_ticks)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{HISTORY_WINDOW, MAX_LEVEL, MIN_LEVEL};
    use crate::stimulus::ScriptedStimuli;
    use assert_matches::assert_matches;

    fn engine(level: usize, max_ticks: u32, script: &str) -> Engine {
        let cfg = SessionConfig::new(level, max_ticks, Duration::from_millis(1000)).unwrap();
        // the first scripted symbol seeds the idle history
        let seq = std::iter::once('F').chain(script.chars());
        Engine::new(cfg, Alphabet::default(), Box::new(ScriptedStimuli::new(seq))).unwrap()
    }

    fn random_engine() -> Engine {
        Engine::random(SessionConfig::default(), Alphabet::default(), Some(3)).unwrap()
    }

    #[test]
    fn new_engine_is_idle_with_seed() {
        let e = random_engine();
        assert_eq!(e.phase(), Phase::Idle);
        assert_eq!(e.tick(), 0);
        assert_eq!(e.score(), 0);
        assert_eq!(e.history().count(), 1);
        assert!(!e.timer_armed());
        assert_eq!(e.disc(), DiscContent::Start);
        assert_eq!(e.current_stimulus(), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = SessionConfig {
            level: 0,
            ..SessionConfig::default()
        };
        assert_matches!(
            Engine::random(cfg, Alphabet::default(), None),
            Err(EngineError::InvalidLevel(0))
        );
    }

    #[test]
    fn start_emits_one_stimulus_and_arms_timer() {
        let mut e = engine(2, 30, "AOPAF");
        e.start();
        assert_eq!(e.phase(), Phase::Running);
        assert_eq!(e.tick(), 1);
        assert!(e.timer_armed());
        assert_eq!(e.current_stimulus(), Some('A'));
        assert_eq!(e.history().collect::<Vec<_>>(), vec!['A']);
    }

    #[test]
    fn each_firing_adds_exactly_one_tick() {
        let mut e = random_engine();
        e.start();
        for expected in 2..=20 {
            assert!(e.fire_timer());
            assert_eq!(e.tick(), expected);
            assert!(e.history().count() <= HISTORY_WINDOW);
        }
        assert_eq!(e.history().count(), HISTORY_WINDOW);
    }

    #[test]
    fn run_stops_at_max_ticks() {
        let mut e = random_engine();
        e.start();
        let max = e.config().max_ticks;
        for _ in 0..max + 5 {
            e.fire_timer();
        }
        assert_eq!(e.tick(), max);
        assert_eq!(e.phase(), Phase::Finished);
        assert!(!e.timer_armed());
        assert!(!e.fire_timer());
    }

    #[test]
    fn last_stimulus_stays_up_until_next_firing() {
        let mut e = engine(1, 2, "AB");
        e.start();
        e.fire_timer();
        assert_eq!(e.tick(), 2);
        assert_eq!(e.phase(), Phase::Running);
        assert_eq!(e.disc(), DiscContent::Stimulus('B'));
        e.fire_timer();
        assert_eq!(e.phase(), Phase::Finished);
        assert_eq!(e.tick(), 2);
        assert_eq!(e.disc(), DiscContent::Score(0));
    }

    #[test]
    fn feedback_is_cleared_every_tick() {
        let mut e = engine(1, 10, "AAB");
        e.start();
        e.fire_timer();
        assert_eq!(e.submit_guess(), Ok(Feedback::Correct));
        assert_eq!(e.feedback(), Feedback::Correct);
        e.fire_timer();
        assert_eq!(e.feedback(), Feedback::None);
    }

    #[test]
    fn matching_guess_scores_up() {
        // A, O, A: history [A, O, A], level 2 matches
        let mut e = engine(2, 10, "AOA");
        e.start();
        e.fire_timer();
        e.fire_timer();
        assert_eq!(e.submit_guess(), Ok(Feedback::Correct));
        assert_eq!(e.score(), 1);
    }

    #[test]
    fn mismatching_guess_scores_down() {
        let mut e = engine(2, 10, "AOP");
        e.start();
        e.fire_timer();
        e.fire_timer();
        assert_eq!(e.submit_guess(), Ok(Feedback::Wrong));
        assert_eq!(e.feedback(), Feedback::Wrong);
        assert_eq!(e.score(), -1);
    }

    #[test]
    fn guess_with_short_history_is_wrong() {
        // same letter twice, but level 3 cannot reach back yet
        let mut e = engine(3, 10, "AAAA");
        e.start();
        e.fire_timer();
        e.fire_timer();
        assert_eq!(e.tick(), 3);
        assert_eq!(e.submit_guess(), Ok(Feedback::Wrong));
        assert_eq!(e.score(), -1);
    }

    #[test]
    fn score_can_go_negative() {
        let mut e = engine(1, 10, "AO");
        e.start();
        for _ in 0..3 {
            e.submit_guess().unwrap();
        }
        assert_eq!(e.score(), -3);
    }

    #[test]
    fn guess_outside_running_is_rejected_without_change() {
        let mut e = random_engine();
        assert_eq!(e.submit_guess(), Err(EngineError::NotRunning(Phase::Idle)));
        assert_eq!(e.score(), 0);
        assert_eq!(e.feedback(), Feedback::None);

        e.start();
        for _ in 0..40 {
            e.fire_timer();
        }
        let score = e.score();
        assert_eq!(
            e.submit_guess(),
            Err(EngineError::NotRunning(Phase::Finished))
        );
        assert_eq!(e.score(), score);
    }

    #[test]
    fn set_level_resets_for_every_valid_level() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            let mut e = random_engine();
            e.start();
            e.fire_timer();
            let _ = e.submit_guess();
            e.set_level(level).unwrap();
            assert_eq!(e.level(), level);
            assert_eq!(e.phase(), Phase::Idle);
            assert_eq!(e.tick(), 0);
            assert_eq!(e.score(), 0);
            assert_eq!(e.feedback(), Feedback::None);
            assert_eq!(e.history().count(), 1);
            assert!(!e.timer_armed());
        }
    }

    #[test]
    fn set_level_out_of_range_leaves_state_alone() {
        let mut e = engine(2, 10, "AOP");
        e.start();
        e.fire_timer();
        assert_eq!(e.set_level(0), Err(EngineError::InvalidLevel(0)));
        assert_eq!(e.set_level(10), Err(EngineError::InvalidLevel(10)));
        assert_eq!(e.level(), 2);
        assert_eq!(e.phase(), Phase::Running);
        assert_eq!(e.tick(), 2);
        assert!(e.timer_armed());
    }

    #[test]
    fn set_level_twice_equals_once() {
        let mut once = random_engine();
        once.start();
        once.set_level(4).unwrap();

        let mut twice = random_engine();
        twice.start();
        twice.set_level(4).unwrap();
        twice.set_level(4).unwrap();

        assert_eq!(once.level(), twice.level());
        assert_eq!(once.phase(), twice.phase());
        assert_eq!(once.tick(), twice.tick());
        assert_eq!(once.score(), twice.score());
        assert_eq!(once.feedback(), twice.feedback());
        assert_eq!(once.history().count(), twice.history().count());
        assert_eq!(once.timer_armed(), twice.timer_armed());
    }

    #[test]
    fn restart_from_finished_returns_to_idle() {
        let mut e = engine(1, 1, "A");
        e.start();
        e.fire_timer();
        assert_eq!(e.phase(), Phase::Finished);
        e.restart();
        assert_eq!(e.phase(), Phase::Idle);
        assert_eq!(e.level(), 1);
        e.start();
        assert_eq!(e.phase(), Phase::Running);
        assert_eq!(e.tick(), 1);
    }

    #[test]
    fn restarting_a_run_replaces_the_timer() {
        let t0 = Instant::now();
        let mut e = engine(1, 30, "AOPF");
        e.start_at(t0);
        e.advance(t0 + Duration::from_millis(1000));
        assert_eq!(e.tick(), 2);

        e.start_at(t0 + Duration::from_millis(1500));
        assert_eq!(e.tick(), 1);
        assert_eq!(e.score(), 0);
        // the old schedule (due at 2000ms) no longer fires
        assert!(!e.advance(t0 + Duration::from_millis(2000)));
        assert!(e.advance(t0 + Duration::from_millis(2500)));
        assert_eq!(e.tick(), 2);
    }

    #[test]
    fn advance_follows_the_interval() {
        let t0 = Instant::now();
        let mut e = random_engine();
        e.start_at(t0);
        assert!(!e.advance(t0 + Duration::from_millis(999)));
        assert_eq!(e.tick(), 1);
        assert!(e.advance(t0 + Duration::from_millis(1000)));
        assert_eq!(e.tick(), 2);
        assert!(!e.advance(t0 + Duration::from_millis(1500)));
        assert!(e.advance(t0 + Duration::from_millis(2001)));
        assert_eq!(e.tick(), 3);
    }

    #[test]
    fn advance_does_not_burst_after_a_stall() {
        let t0 = Instant::now();
        let mut e = random_engine();
        e.start_at(t0);
        assert!(e.advance(t0 + Duration::from_millis(5000)));
        assert_eq!(e.tick(), 2);
        assert!(!e.advance(t0 + Duration::from_millis(5500)));
        assert!(e.advance(t0 + Duration::from_millis(6000)));
        assert_eq!(e.tick(), 3);
    }

    #[test]
    fn advance_is_inert_when_idle() {
        let t0 = Instant::now();
        let mut e = random_engine();
        assert!(!e.advance(t0 + Duration::from_secs(60)));
        assert_eq!(e.phase(), Phase::Idle);
    }

    #[test]
    fn progress_tracks_ticks() {
        let mut e = engine(1, 4, "AOPF");
        assert_eq!(e.progress(), 0.0);
        e.start();
        assert_eq!(e.progress(), 0.25);
        for _ in 0..10 {
            e.fire_timer();
        }
        assert_eq!(e.progress(), 1.0);
    }
}
