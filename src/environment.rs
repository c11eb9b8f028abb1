//! Where the application is running.

use serde::{Deserialize, Serialize};

/// Host operating system, named the way Node's `process.platform` names it
/// since that is the form pages already understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Aix,
    Android,
    Darwin,
    Freebsd,
    Haiku,
    Linux,
    Openbsd,
    Sunos,
    Win32,
    Cygwin,
    Netbsd,
    #[serde(other)]
    Other,
}

impl OperatingSystem {
    /// The platform this process was built for.
    pub fn current() -> Self {
        Self::from_rust_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_rust_os(os: &str) -> Self {
        match os {
            "macos" | "ios" => Self::Darwin,
            "windows" => Self::Win32,
            "linux" => Self::Linux,
            "android" => Self::Android,
            "freebsd" | "dragonfly" => Self::Freebsd,
            "openbsd" => Self::Openbsd,
            "netbsd" => Self::Netbsd,
            "solaris" | "illumos" => Self::Sunos,
            "aix" => Self::Aix,
            "haiku" => Self::Haiku,
            _ => Self::Other,
        }
    }
}

/// The runtime as a page sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    /// No host attached
    Browser,
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Runtime {
    /// Runtime for a page with a host on `os`.
    pub fn from_os(os: OperatingSystem) -> Self {
        match os {
            OperatingSystem::Darwin => Self::MacOs,
            OperatingSystem::Win32 => Self::Windows,
            OperatingSystem::Linux => Self::Linux,
            _ => Self::Other,
        }
    }

    /// Runtime before the host has reported its platform.
    pub fn initial(host_attached: bool) -> Self {
        if host_attached { Self::Other } else { Self::Browser }
    }

    pub fn is_browser(self) -> bool {
        self == Self::Browser
    }

    pub fn is_desktop_app(self) -> bool {
        !self.is_browser()
    }
}
