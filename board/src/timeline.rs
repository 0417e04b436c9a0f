//! Rolling per-tile explosion schedule.

use blastfield_core::{PlayerId, BOMB_TIMEOUT, MAX_PLAYERS};

const _: () = assert!(BOMB_TIMEOUT <= u8::BITS as usize);

/// Explosions scheduled on one tile, one bit per relative turn.
///
/// Bit `i` is set when the tile explodes `i + 1` turns from now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct Window(u8);

impl Window {
    /// Offset of the soonest scheduled explosion.
    pub(crate) fn earliest(self) -> Option<usize> {
        (self.0 != 0).then(|| self.0.trailing_zeros() as usize)
    }

    /// Offset of the latest scheduled explosion.
    pub(crate) fn latest(self) -> Option<usize> {
        (self.0 != 0).then(|| (u8::BITS - 1 - self.0.leading_zeros()) as usize)
    }

    /// Number of scheduled explosions.
    pub(crate) fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether an explosion is scheduled at `offset`.
    pub(crate) fn contains(self, offset: usize) -> bool {
        offset < BOMB_TIMEOUT && self.0 & (1 << offset) != 0
    }

    /// Number of explosions scheduled strictly before `offset`.
    pub(crate) fn count_before(self, offset: usize) -> u32 {
        let mask = u8::try_from((1u16 << offset.min(BOMB_TIMEOUT)) - 1).unwrap_or(u8::MAX);
        (self.0 & mask).count_ones()
    }
}

/// Explosion windows for every tile plus the per-turn destroyed-box tallies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ExplosionTimeline {
    windows: Vec<Window>,
    tallies: [[u16; MAX_PLAYERS]; BOMB_TIMEOUT],
}

impl ExplosionTimeline {
    /// Creates an empty timeline covering `tile_count` tiles.
    pub(crate) fn new(tile_count: usize) -> Self {
        Self {
            windows: vec![Window::default(); tile_count],
            tallies: [[0; MAX_PLAYERS]; BOMB_TIMEOUT],
        }
    }

    /// Window describing the explosions scheduled on a tile.
    pub(crate) fn window(&self, tile: usize) -> Window {
        self.windows.get(tile).copied().unwrap_or_default()
    }

    /// Marks `tile` as exploding `offset + 1` turns from now.
    pub(crate) fn schedule(&mut self, offset: usize, tile: usize) {
        if offset >= BOMB_TIMEOUT {
            return;
        }
        if let Some(window) = self.windows.get_mut(tile) {
            window.0 |= 1 << offset;
        }
    }

    /// Credits `player` with one box destroyed at `offset`.
    pub(crate) fn credit(&mut self, offset: usize, player: PlayerId) {
        if let Some(slot) = self
            .tallies
            .get_mut(offset)
            .and_then(|row| row.get_mut(player.index()))
        {
            *slot += 1;
        }
    }

    /// Boxes `player` is scheduled to destroy at `offset`.
    pub(crate) fn tally(&self, offset: usize, player: PlayerId) -> u16 {
        self.tallies
            .get(offset)
            .and_then(|row| row.get(player.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Discards every explosion and tally at `offset` or later.
    pub(crate) fn clear_from(&mut self, offset: usize) {
        let offset = offset.min(BOMB_TIMEOUT);
        let keep = u8::try_from((1u16 << offset) - 1).unwrap_or(u8::MAX);
        for window in &mut self.windows {
            window.0 &= keep;
        }
        for row in &mut self.tallies[offset..] {
            *row = [0; MAX_PLAYERS];
        }
    }

    /// Slides every window one turn closer, discarding offset zero.
    pub(crate) fn advance(&mut self) {
        for window in &mut self.windows {
            window.0 >>= 1;
        }
        self.tallies.rotate_left(1);
        self.tallies[BOMB_TIMEOUT - 1] = [0; MAX_PLAYERS];
    }
}
