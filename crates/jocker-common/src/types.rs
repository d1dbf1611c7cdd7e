//! Domain primitive types used across the jocker workspace.

use std::fmt;

/// The (uid, gid) pair a command is executed under.
///
/// Always taken from the owner of the home directory, never from the
/// command file and never from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityBinding {
    /// Numeric user id.
    pub uid: u32,
    /// Numeric group id.
    pub gid: u32,
}

impl IdentityBinding {
    /// Creates a binding from raw ids.
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

impl fmt::Display for IdentityBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

/// How the helper process terminated. Relayed to callers uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitOutcome {
    /// The helper exited with the given status code.
    Exited(i32),
    /// The helper was terminated by the given signal number.
    Signaled(i32),
}

impl ExitOutcome {
    /// Returns a shell-style exit code: the status itself, or `128 + signal`.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => 128 + signal,
        }
    }

    /// Returns `true` if the helper exited with status 0.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled(signal) => write!(f, "terminated by signal {signal}"),
        }
    }
}
