use bevy::prelude::Resource;

use crate::context::SimulationContext;
use crate::cpu::encoder::{EncodedState, StateGrid};
use crate::error::ComputeError;
use crate::params::FlowParams;

/// Two equally sized slots. `current` is the slot holding the latest
/// result ("read"); the other one is the next write target. Swapping only
/// flips the index, slots never move.
#[derive(Clone, Debug)]
pub struct PingPong<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    /// `a` starts as read, `b` as write.
    pub fn new(a: T, b: T) -> Self {
        Self {
            slots: [a, b],
            current: 0,
        }
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn write_index(&self) -> usize {
        1 - self.current
    }

    pub fn read(&self) -> &T {
        &self.slots[self.current]
    }

    pub fn write(&self) -> &T {
        &self.slots[1 - self.current]
    }

    /// Borrow both roles at once for a step.
    pub fn split(&mut self) -> (&T, &mut T) {
        let (a, b) = self.slots.split_at_mut(1);
        if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }
}

/// Something that can hold particle state and run one flow step on it.
/// The CPU reference computes in place; the GPU backend records a dispatch
/// for the render graph.
pub trait FlowBackend {
    type Slot;

    fn allocate(&mut self, state: &EncodedState) -> Self::Slot;

    fn advance(
        &mut self,
        grid: &StateGrid,
        read: &Self::Slot,
        write: &mut Self::Slot,
        base: &Self::Slot,
        ctx: &SimulationContext,
        params: &FlowParams,
    );
}

#[derive(Debug)]
struct Slots<S> {
    grid: StateGrid,
    buffers: PingPong<S>,
    base: S,
}

/// Owner of the particle state pair. Sole writer of simulation state.
#[derive(Resource, Debug)]
pub struct ComputeStage<S: Send + Sync + 'static> {
    slots: Option<Slots<S>>,
}

impl<S: Send + Sync + 'static> Default for ComputeStage<S> {
    fn default() -> Self {
        Self { slots: None }
    }
}

impl<S: Send + Sync + 'static> ComputeStage<S> {
    /// Uploads `state` into both slots so the first step has a valid
    /// "previous" frame, plus once more as the immutable base.
    pub fn initialize<B>(&mut self, backend: &mut B, state: &EncodedState)
    where
        B: FlowBackend<Slot = S>,
    {
        let a = backend.allocate(state);
        let b = backend.allocate(state);
        let base = backend.allocate(state);
        self.slots = Some(Slots {
            grid: state.grid,
            buffers: PingPong::new(a, b),
            base,
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.slots.is_some()
    }

    pub fn step<B>(
        &mut self,
        backend: &mut B,
        ctx: &SimulationContext,
        params: &FlowParams,
    ) -> Result<(), ComputeError>
    where
        B: FlowBackend<Slot = S>,
    {
        let slots = self.slots.as_mut().ok_or(ComputeError::Uninitialized)?;
        let (read, write) = slots.buffers.split();
        backend.advance(&slots.grid, read, write, &slots.base, ctx, params);
        slots.buffers.swap();
        Ok(())
    }

    /// Latest state. Stable until the next `step`; re-fetch after stepping.
    pub fn current_state(&self) -> Result<&S, ComputeError> {
        self.slots
            .as_ref()
            .map(|slots| slots.buffers.read())
            .ok_or(ComputeError::Uninitialized)
    }

    pub fn current_index(&self) -> Result<usize, ComputeError> {
        self.slots
            .as_ref()
            .map(|slots| slots.buffers.current_index())
            .ok_or(ComputeError::Uninitialized)
    }

    pub fn base_state(&self) -> Result<&S, ComputeError> {
        self.slots
            .as_ref()
            .map(|slots| &slots.base)
            .ok_or(ComputeError::Uninitialized)
    }

    pub fn grid(&self) -> Result<StateGrid, ComputeError> {
        self.slots
            .as_ref()
            .map(|slots| slots.grid)
            .ok_or(ComputeError::Uninitialized)
    }
}
