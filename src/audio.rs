//! Audio contract used by weapons and the boss
//!
//! The simulation only needs fire-and-forget playback plus looping sounds that can
//! be stopped by handle. Actual mixing is done by whatever backend implements
//! [`AudioSink`].

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Energy projectile fired
    EnergyShot,
    /// Energy projectile bounced off a wall
    EnergyBounce,
    /// Saber ignition
    SaberOn,
    /// Saber hum (looping while active)
    SaberHum,
    /// Saber switched off
    SaberOff,
    /// Mob killed
    MobDeath,
    /// Player took damage
    PlayerHurt,
    /// Pickup or key collected
    Pickup,
    /// Boss roar on entry
    BossRoar,
    /// Boss charge wind-up
    BossCharge,
    /// Boss homing laser fired
    BossLaser,
    /// Boss explosion during death sequence
    BossExplosion,
    /// Arcade ship fired
    ArcadeShot,
    /// Arcade weapon overheated
    ArcadeOverheat,
    /// Arcade explosion
    ArcadeExplosion,
}

/// Handle for a looping sound instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// Backend that plays sounds
pub trait AudioSink {
    /// Play a one-shot effect
    fn play(&mut self, effect: SoundEffect);
    /// Start a looping effect, returning a handle that stops it
    fn play_looping(&mut self, effect: SoundEffect) -> SoundHandle;
    /// Stop a looping effect (unknown handles are ignored)
    fn stop(&mut self, handle: SoundHandle);
    /// Effective output volume changed
    fn set_volume(&mut self, _volume: f32) {}
}

/// Sink that discards everything (headless runs)
#[derive(Debug, Default)]
pub struct NullAudio {
    next_handle: u32,
}

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}

    fn play_looping(&mut self, _effect: SoundEffect) -> SoundHandle {
        self.next_handle += 1;
        SoundHandle(self.next_handle)
    }

    fn stop(&mut self, _handle: SoundHandle) {}
}

/// Recorded audio call (for tests and replays)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    Play(SoundEffect),
    Loop(SoundEffect, SoundHandle),
    Stop(SoundHandle),
}

/// Sink that records every call and tracks which loops are still playing
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub calls: Vec<AudioCall>,
    pub looping: Vec<SoundHandle>,
    next_handle: u32,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a one-shot effect was played
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, AudioCall::Play(e) if *e == effect))
            .count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.calls.push(AudioCall::Play(effect));
    }

    fn play_looping(&mut self, effect: SoundEffect) -> SoundHandle {
        self.next_handle += 1;
        let handle = SoundHandle(self.next_handle);
        self.calls.push(AudioCall::Loop(effect, handle));
        self.looping.push(handle);
        handle
    }

    fn stop(&mut self, handle: SoundHandle) {
        self.calls.push(AudioCall::Stop(handle));
        self.looping.retain(|h| *h != handle);
    }
}

/// Volume/mute front-end over a backend sink
pub struct AudioManager<S: AudioSink> {
    backend: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(backend: S) -> Self {
        let mut manager = Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        };
        manager.push_volume();
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.push_volume();
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
        self.push_volume();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.push_volume();
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn push_volume(&mut self) {
        let vol = self.effective_volume();
        self.backend.set_volume(vol);
    }
}

impl<S: AudioSink> AudioSink for AudioManager<S> {
    fn play(&mut self, effect: SoundEffect) {
        // One-shots are dropped entirely when silent
        if self.effective_volume() <= 0.0 {
            return;
        }
        self.backend.play(effect);
    }

    fn play_looping(&mut self, effect: SoundEffect) -> SoundHandle {
        // Loops always start so that their handle stays valid across unmute
        self.backend.play_looping(effect)
    }

    fn stop(&mut self, handle: SoundHandle) {
        self.backend.stop(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_tracks_loops() {
        let mut audio = RecordingAudio::new();
        let hum = audio.play_looping(SoundEffect::SaberHum);
        audio.play(SoundEffect::SaberOn);
        assert_eq!(audio.looping, vec![hum]);
        audio.stop(hum);
        assert!(audio.looping.is_empty());
        assert_eq!(audio.count(SoundEffect::SaberOn), 1);
    }

    #[test]
    fn test_muted_manager_drops_one_shots() {
        let mut manager = AudioManager::new(RecordingAudio::new());
        manager.set_muted(true);
        manager.play(SoundEffect::MobDeath);
        let handle = manager.play_looping(SoundEffect::SaberHum);
        assert_eq!(manager.backend().count(SoundEffect::MobDeath), 0);
        assert_eq!(manager.backend().looping, vec![handle]);
    }
}
