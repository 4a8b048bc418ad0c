//! Pose channel - last-write-wins string register shared by a session
//!
//! The register keeps only its latest value. An observer that falls behind
//! sees the newest payload once; intermediate writes are never queued.

use std::sync::Arc;

use parking_lot::Mutex;

/// Replicated string slot carrying one hand's payload
pub trait PoseChannel {
    /// Overwrite the replicated value
    fn publish(&mut self, payload: &str);

    /// Latest value, if it changed since this handle last looked
    fn take_changed(&mut self) -> Option<String>;

    /// Current value, whether or not it changed
    fn current(&self) -> Option<String>;

    /// Nothing has ever been written
    fn is_fresh(&self) -> bool;
}

#[derive(Debug, Default)]
struct RegisterState {
    value: String,
    version: u64,
}

/// In-process last-write-wins register
#[derive(Debug, Clone, Default)]
pub struct SharedRegister {
    state: Arc<Mutex<RegisterState>>,
}

impl SharedRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// New handle; it has not yet observed any write
    pub fn handle(&self) -> RegisterHandle {
        RegisterHandle {
            register: self.clone(),
            seen: 0,
        }
    }

    /// Store `value`, returning the new version. Writing the current value
    /// again is not a change.
    pub fn write(&self, value: &str) -> u64 {
        let mut state = self.state.lock();
        if state.version == 0 || state.value != value {
            state.value.clear();
            state.value.push_str(value);
            state.version += 1;
        }
        state.version
    }

    pub fn version(&self) -> u64 {
        self.state.lock().version
    }

    pub fn value(&self) -> Option<String> {
        let state = self.state.lock();
        (state.version > 0).then(|| state.value.clone())
    }
}

/// One participant's handle on a `SharedRegister`
#[derive(Debug, Clone)]
pub struct RegisterHandle {
    register: SharedRegister,
    seen: u64,
}

impl RegisterHandle {
    pub fn register(&self) -> &SharedRegister {
        &self.register
    }
}

impl PoseChannel for RegisterHandle {
    fn publish(&mut self, payload: &str) {
        // Own writes are not reported back as changes
        self.seen = self.register.write(payload);
    }

    fn take_changed(&mut self) -> Option<String> {
        let state = self.register.state.lock();
        if state.version > self.seen {
            self.seen = state.version;
            Some(state.value.clone())
        } else {
            None
        }
    }

    fn current(&self) -> Option<String> {
        self.register.value()
    }

    fn is_fresh(&self) -> bool {
        self.register.version() == 0
    }
}
