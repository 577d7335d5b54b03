use bevy::prelude::*;

/// Per-tick clock handed to the compute step. Owned by the frame driver;
/// tests build one with whatever times they need.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationContext {
    pub elapsed: f32,
    pub delta: f32,
    pub frame: u64,
}

impl SimulationContext {
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self {
            elapsed,
            delta,
            frame: 0,
        }
    }

    /// Moves the clock to `elapsed` seconds. Delta never goes negative, a
    /// clock that steps back just yields a zero-length tick.
    pub fn advance(&mut self, elapsed: f32) {
        self.delta = (elapsed - self.elapsed).max(0.0);
        self.elapsed = elapsed.max(self.elapsed);
        self.frame += 1;
    }
}

pub fn advance_simulation_context(time: Res<Time>, mut ctx: ResMut<SimulationContext>) {
    ctx.advance(time.elapsed_secs());
}
