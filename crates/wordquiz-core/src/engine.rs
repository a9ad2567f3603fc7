//! Game engine orchestrator.
//!
//! Binds one [`Catalog`] to the session state machine, the option selector
//! and the narrator, and sequences the delays between them. All entry
//! points take `&self`: state lives behind a mutex that is never held
//! across an `.await`, so a click can land while a delay or an utterance is
//! pending.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::answer::{self, Verdict};
use crate::error::GameError;
use crate::model::{Catalog, GameItem, SessionState};
use crate::narration::{NarrationOutcome, Narrator, DEFAULT_NARRATION_TIMEOUT};
use crate::options::{build_challenge, Challenge};
use crate::session::Session;
use crate::traits::{CueBackend, VoiceBackend};

/// Configuration for the game engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Start with narration switched on.
    pub narration_enabled: bool,
    /// Hard cap on a single utterance.
    pub narration_timeout: Duration,
    /// Seed for challenge and option selection; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            narration_enabled: true,
            narration_timeout: DEFAULT_NARRATION_TIMEOUT,
            seed: None,
        }
    }
}

struct Inner {
    session: Session,
    rng: StdRng,
}

/// One quiz, parameterized by its catalog.
pub struct GameEngine {
    catalog: Arc<Catalog>,
    inner: Mutex<Inner>,
    narrator: Narrator,
    updates: watch::Sender<SessionState>,
}

impl GameEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        voice: Option<Arc<dyn VoiceBackend>>,
        cue: Option<Arc<dyn CueBackend>>,
        config: EngineConfig,
    ) -> Result<Self, GameError> {
        check_constants(&catalog)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let narrator = Narrator::new(voice, cue, config.narration_timeout);
        narrator.set_enabled(config.narration_enabled);
        let (updates, _) = watch::channel(SessionState::idle());

        Ok(Self {
            catalog,
            inner: Mutex::new(Inner {
                session: Session::new(),
                rng,
            }),
            narrator,
            updates,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// Snapshot of the current session record.
    pub fn state(&self) -> SessionState {
        self.lock().session.state().clone()
    }

    /// Receive every published session record, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// Begin a fresh run.
    ///
    /// Speaks the start cue while waiting out the start delay, installs the
    /// first challenge, then narrates it once the cue is over. A reset
    /// arriving meanwhile wins: the pending challenge is dropped.
    #[instrument(skip(self), fields(category = %self.catalog.id, session = tracing::field::Empty))]
    pub async fn start_game(&self) -> Result<(), GameError> {
        let constants = &self.catalog.constants;

        let (epoch, first, snapshot) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            let epoch = inner.session.begin_start();
            tracing::Span::current().record("session", tracing::field::display(inner.session.id()));
            let Some(first) =
                build_challenge(&self.catalog.items, 1, constants, None, &mut inner.rng)
            else {
                inner.session.reset();
                self.publish(inner.session.state().clone());
                return Err(GameError::EmptyPool(self.catalog.id.clone()));
            };
            (epoch, first, inner.session.state().clone())
        };
        self.publish(snapshot);
        info!(items = self.catalog.items.len(), "game started");

        // The first challenge goes up after a fixed delay; the start cue only
        // gates when the first item is spoken, never when it is shown.
        let target = first.target.clone();
        let cue = self
            .narrator
            .speak(&self.catalog.script.start_cue, &self.catalog.locale);
        let install = async {
            tokio::time::sleep(Duration::from_millis(constants.start_delay_ms)).await;
            self.apply(|session| session.install_first(epoch, first))
        };
        let (_, installed) = tokio::join!(cue, install);
        if !installed {
            debug!("session changed during start delay, dropping first challenge");
            return Ok(());
        }

        self.repaint(constants.repaint_delay_ms).await;
        if self.is_showing(epoch, &target) {
            self.narrate_item(&target).await;
        }
        Ok(())
    }

    /// Return to the idle record. In-flight narration is left to finish.
    #[instrument(skip(self), fields(category = %self.catalog.id))]
    pub fn reset_game(&self) {
        let snapshot = {
            let mut guard = self.lock();
            guard.session.reset();
            guard.session.state().clone()
        };
        self.publish(snapshot);
        info!("game reset");
    }

    /// React to the learner picking `item`.
    ///
    /// Correct: success cue, score/level update, celebration dwell, next
    /// challenge, narration. Wrong: the current challenge is narrated again
    /// and nothing else changes. Ignored: nothing happens.
    #[instrument(skip(self, item), fields(category = %self.catalog.id, item = %item.name))]
    pub async fn handle_item_click(&self, item: &GameItem) -> Verdict {
        let constants = &self.catalog.constants;

        let (verdict, step) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            let verdict = answer::evaluate(inner.session.state(), item);
            let step = match verdict {
                Verdict::Correct => {
                    let previous = inner.session.state().current_challenge.clone();
                    inner.session.award(constants);
                    let state = inner.session.state();
                    let next = build_challenge(
                        &self.catalog.items,
                        state.level,
                        constants,
                        previous.as_ref(),
                        &mut inner.rng,
                    );
                    Step::Celebrate {
                        epoch: inner.session.epoch(),
                        next,
                        snapshot: state.clone(),
                    }
                }
                Verdict::Wrong => match &inner.session.state().current_challenge {
                    Some(target) => Step::Repeat(target.clone()),
                    None => Step::Nothing,
                },
                Verdict::Ignored => Step::Nothing,
            };
            (verdict, step)
        };

        match step {
            Step::Celebrate {
                epoch,
                next,
                snapshot,
            } => {
                self.narrator.play_success_cue();
                info!(score = snapshot.score, level = snapshot.level, "correct");
                self.publish(snapshot);

                tokio::time::sleep(Duration::from_millis(constants.next_item_delay_ms)).await;

                let target = next.as_ref().map(|c| c.target.clone());
                if !self.apply(|session| session.install_next(epoch, next)) {
                    debug!("session changed during celebration, dropping next challenge");
                    return verdict;
                }
                self.repaint(constants.repaint_delay_ms).await;
                if let Some(target) = target {
                    self.narrate_item(&target).await;
                }
            }
            Step::Repeat(target) => {
                debug!(expected = %target.name, "wrong answer");
                tokio::time::sleep(Duration::from_millis(constants.repaint_delay_ms)).await;
                self.narrate_item(&target).await;
            }
            Step::Nothing => debug!("click ignored"),
        }

        verdict
    }

    /// Speak the prompt for `item` in the catalog's locale.
    pub async fn narrate_item(&self, item: &GameItem) -> NarrationOutcome {
        let spoken = self.catalog.spoken_text(item);
        let text = self.catalog.script.prompt_for(spoken);
        self.narrator.speak(&text, &self.catalog.locale).await
    }

    /// Run `transition` under the lock and publish if it applied.
    fn apply(&self, transition: impl FnOnce(&mut Session) -> bool) -> bool {
        let snapshot = {
            let mut guard = self.lock();
            if !transition(&mut guard.session) {
                return false;
            }
            guard.session.state().clone()
        };
        self.publish(snapshot);
        true
    }

    /// Whether `target` is still the challenge on screen for the run `epoch`.
    fn is_showing(&self, epoch: u64, target: &GameItem) -> bool {
        let guard = self.lock();
        guard.session.epoch() == epoch
            && guard
                .session
                .state()
                .current_challenge
                .as_ref()
                .is_some_and(|c| c.name == target.name)
    }

    fn publish(&self, state: SessionState) {
        self.updates.send_replace(state);
    }

    /// Give renderers a chance to draw the state just published before
    /// anything is said about it.
    async fn repaint(&self, delay_ms: u64) {
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Step {
    Celebrate {
        epoch: u64,
        next: Option<Challenge>,
        snapshot: SessionState,
    },
    Repeat(GameItem),
    Nothing,
}

/// Reject constants the engine cannot run with; `validate` reports the same
/// list through [`GameConstants::problems`](crate::model::GameConstants::problems).
pub fn check_constants(catalog: &Catalog) -> Result<(), GameError> {
    match catalog.constants.problems().first() {
        Some(message) => Err(GameError::InvalidConstants(format!(
            "{} ({})",
            message, catalog.id
        ))),
        None => Ok(()),
    }
}
