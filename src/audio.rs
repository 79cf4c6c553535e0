//! Sound-cue plumbing.
//!
//! The core never touches an audio backend. It pushes `Play`/`Stop` events
//! into a `Mixer` queue and the frontend drains the queue once per frame.
//! The mute flag lives on the mixer and gates `play` only; a stop must go
//! through even while muted so a looping cue can still be ended.

/// Every sound effect the game can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    PlayerShoot,
    AsteroidHit,
    UfoShoot,
    UfoDie,
    ShipShoot,
    ShipDie,
    BossShoot,
    BossHit,
    BossDie,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SfxEvent {
    Play(Cue),
    Stop(Cue),
}

/// Queue of pending sound events plus the session-wide mute switch.
#[derive(Debug, Default)]
pub struct Mixer {
    pub muted: bool,
    events: Vec<SfxEvent>,
}

impl Mixer {
    pub fn new() -> Self {
        Mixer::default()
    }

    /// Queue a cue unless sound is muted.
    pub fn play(&mut self, cue: Cue) {
        if !self.muted {
            self.events.push(SfxEvent::Play(cue));
        }
    }

    /// Queue a stop. Not gated on mute: a muted player still expects a
    /// looping cue to end.
    pub fn stop(&mut self, cue: Cue) {
        self.events.push(SfxEvent::Stop(cue));
    }

    /// Stop-then-play, restarting a cue that may already be sounding.
    pub fn restart(&mut self, cue: Cue) {
        self.stop(cue);
        self.play(cue);
    }

    /// Hand the queued events to the frontend and clear the queue.
    pub fn drain(&mut self) -> Vec<SfxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at what is queued without draining (used by tests).
    pub fn pending(&self) -> &[SfxEvent] {
        &self.events
    }
}
