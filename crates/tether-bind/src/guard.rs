//! Host-side guard for members whose body was replaced.
//!
//! A replaced member is compiled out of the host program, but untranslated
//! host code may still hold a reference to it. Such a call must fail loudly
//! at the call instead of silently running the discarded host body.

use std::fmt;

/// Fixed message carried by every [`ClientSideOnlyInvocation`].
pub const CLIENT_SIDE_ONLY_MESSAGE: &str =
    "this member has a replaced body and only exists in translated code; \
     exclude the caller from host compilation or translate it as well";

/// Raised when a translation-only member is invoked from host code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSideOnlyInvocation {
    /// Signature of the member that was invoked.
    pub member: String,
}

impl ClientSideOnlyInvocation {
    pub fn message(&self) -> &'static str {
        CLIENT_SIDE_ONLY_MESSAGE
    }
}

impl fmt::Display for ClientSideOnlyInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.member, CLIENT_SIDE_ONLY_MESSAGE)
    }
}

impl std::error::Error for ClientSideOnlyInvocation {}

/// The host-side stand-in for a member whose body was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStub {
    pub member: String,
}

impl HostStub {
    pub fn new(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
        }
    }

    /// Invoke the stub. Always fails, whatever the member would return.
    pub fn invoke<T>(&self) -> Result<T, ClientSideOnlyInvocation> {
        Err(ClientSideOnlyInvocation {
            member: self.member.clone(),
        })
    }
}
