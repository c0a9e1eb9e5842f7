//! # Playback Scheduler
//!
//! Applies the autoplay concurrency policy to the candidates of a feed.
//!
//! Candidates are visited in container order. The first ones that want to
//! play take the active slot (one slot in [`AutoplayMode::OneAtATime`], all of
//! them in [`AutoplayMode::MultipleSimultaneously`]); every other playing
//! candidate is paused. Candidates without a live surface are skipped.

use core_runtime::config::AutoplayMode;

/// A feed slot the scheduler can drive.
#[cfg_attr(test, mockall::automock)]
pub trait Playable {
    /// Whether the slot holds a live surface.
    fn is_truly_playable(&self) -> bool;

    fn wants_to_play(&self) -> bool;

    fn is_playing(&self) -> bool;

    fn start(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn release(&mut self);

    fn on_playability_changed(&mut self, is_playable: bool);
}

/// Inputs of one scheduling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePass {
    pub mode: AutoplayMode,
    pub autoplay_enabled: bool,
    /// Whether new playback may start (see [`crate::policy::should_reevaluate`]).
    pub allow_start: bool,
}

/// What a scheduling pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub candidates: usize,
    pub started: usize,
    pub paused: usize,
    /// Candidates holding an active slot, whether or not their start was
    /// suppressed.
    pub active: usize,
}

/// Run one scheduling pass over `candidates` in container order.
pub fn reschedule<'a, P, I>(candidates: I, pass: SchedulePass) -> ScheduleOutcome
where
    P: Playable + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut P>,
{
    let multiple = pass.mode == AutoplayMode::MultipleSimultaneously;
    let mut outcome = ScheduleOutcome::default();
    let mut has_active_item = false;

    for playable in candidates
        .into_iter()
        .filter(|playable| playable.is_truly_playable())
    {
        outcome.candidates += 1;
        let in_playable_area = playable.wants_to_play();

        if in_playable_area && (!has_active_item || multiple) {
            if !playable.is_playing() && pass.autoplay_enabled && pass.allow_start {
                playable.start();
                outcome.started += 1;
            }

            has_active_item = true;
            outcome.active += 1;
        } else if playable.is_playing() {
            playable.pause();
            outcome.paused += 1;
        }

        playable.on_playability_changed(in_playable_area);
    }

    outcome
}

/// Pause every truly playable candidate.
pub fn pause_all<'a, P, I>(candidates: I) -> usize
where
    P: Playable + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut P>,
{
    for_each_playable(candidates, |playable| playable.pause())
}

/// Stop every truly playable candidate.
pub fn stop_all<'a, P, I>(candidates: I) -> usize
where
    P: Playable + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut P>,
{
    for_each_playable(candidates, |playable| playable.stop())
}

/// Release every truly playable candidate.
pub fn release_all<'a, P, I>(candidates: I) -> usize
where
    P: Playable + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut P>,
{
    for_each_playable(candidates, |playable| playable.release())
}

fn for_each_playable<'a, P, I, F>(candidates: I, mut command: F) -> usize
where
    P: Playable + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut P>,
    F: FnMut(&mut P),
{
    let mut count = 0;
    for playable in candidates {
        if playable.is_truly_playable() {
            command(playable);
            count += 1;
        }
    }
    count
}
