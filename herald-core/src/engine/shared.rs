//! Engine behind a single lock
//!
//! Transport callbacks and the periodic task run in different contexts. They
//! reach the engine only through [`SharedEngine`], which serializes every
//! operation with one blocking mutex. Nothing inside the engine blocks, so the
//! lock is held only for the duration of one event.
//!
//! Collaborators are called with the lock held and must not call back into
//! the same `SharedEngine`.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::receiver::{ActionError, Engine, EventError, TransportEvent, UserAction, WriteError};
use crate::link::LinkError;
use crate::store::STORE_CAPACITY;
use crate::traits::Collaborators;

pub struct SharedEngine<M: RawMutex, H: Collaborators, const N: usize = STORE_CAPACITY> {
    inner: Mutex<M, RefCell<Engine<H, N>>>,
}

impl<M: RawMutex, H: Collaborators, const N: usize> SharedEngine<M, H, N> {
    pub fn new(engine: Engine<H, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine
    pub fn lock<R>(&self, f: impl FnOnce(&mut Engine<H, N>) -> R) -> R {
        self.inner.lock(|engine| f(&mut engine.borrow_mut()))
    }

    pub fn start(&self) -> Result<(), LinkError> {
        self.lock(|engine| engine.start())
    }

    pub fn handle_transport(&self, event: TransportEvent<'_>) -> Result<(), EventError> {
        self.lock(|engine| engine.handle_transport(event))
    }

    pub fn on_write(&self, offset: u32, data: &[u8]) -> Result<(), WriteError> {
        self.lock(|engine| engine.on_write(offset, data))
    }

    pub fn handle_action(&self, action: UserAction) -> Result<(), ActionError> {
        self.lock(|engine| engine.handle_action(action))
    }

    pub fn tick(&self) {
        self.lock(|engine| engine.tick())
    }

    pub fn disconnect(&self) -> Result<(), LinkError> {
        self.lock(|engine| engine.disconnect())
    }

    /// Take the engine back out of the lock
    pub fn into_inner(self) -> Engine<H, N> {
        self.inner.into_inner().into_inner()
    }
}
