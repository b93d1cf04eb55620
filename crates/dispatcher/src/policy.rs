//! Level policy: global threshold with per-scope overrides

use std::collections::HashMap;

use contracts::{Level, DEFAULT_THRESHOLD};

/// Decides whether a message of a given level is emitted for a scope.
///
/// The scope of a call is the sink name the caller asked for, so an override on
/// `"net"` applies even while `"net"` is not registered and its lines land in the
/// default sink.
#[derive(Debug, Clone)]
pub struct LevelPolicy {
    global: Level,
    scopes: HashMap<String, Level>,
}

impl LevelPolicy {
    pub fn new(global: Level) -> Self {
        Self {
            global,
            scopes: HashMap::new(),
        }
    }

    pub fn global(&self) -> Level {
        self.global
    }

    pub fn set_global(&mut self, level: Level) {
        self.global = level;
    }

    pub fn set_scope(&mut self, scope: impl Into<String>, level: Level) {
        self.scopes.insert(scope.into(), level);
    }

    /// Drop a scope override; returns the removed threshold
    pub fn clear_scope(&mut self, scope: &str) -> Option<Level> {
        self.scopes.remove(scope)
    }

    /// Effective threshold for `scope`
    pub fn threshold(&self, scope: &str) -> Level {
        self.scopes.get(scope).copied().unwrap_or(self.global)
    }

    /// `Off` as a message level is never emitted; `Off` as a threshold blocks everything.
    pub fn should_emit(&self, scope: &str, level: Level) -> bool {
        level < Level::Off && level >= self.threshold(scope)
    }
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
