//! Platform capability detection.
//!
//! Behavior that differs between targets (self-update, directory pickers,
//! autostart, relaunch vs. reload) is queried through [`Platform`] instead of
//! being branched inline. The platform is detected at compile time with
//! [`Platform::current`] and can be constructed explicitly for tests.
//!
//! | OS family | desktop | self-update | directory picker |
//! |-----------|---------|-------------|------------------|
//! | Windows, Linux, macOS | yes | yes | yes |
//! | Android, iOS | no | no | no |
//! | Web | no | no | no |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system family the manager is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsType {
    /// Microsoft Windows
    Windows,
    /// Linux desktop
    Linux,
    /// Apple macOS
    Macos,
    /// Android
    Android,
    /// Apple iOS
    Ios,
    /// Browser or any environment without native OS access
    Web,
}

impl OsType {
    /// The OS family this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Web
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Web => "web",
        };
        f.write_str(name)
    }
}

/// Capability interface for the current target environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    os: OsType,
}

impl Platform {
    /// Create a platform description for an explicit OS family.
    #[must_use]
    pub const fn new(os: OsType) -> Self {
        Self {
            os,
        }
    }

    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        Self::new(OsType::current())
    }

    /// The OS family.
    #[must_use]
    pub const fn os(&self) -> OsType {
        self.os
    }

    /// Windows, Linux or macOS.
    #[must_use]
    pub const fn is_desktop(&self) -> bool {
        matches!(self.os, OsType::Windows | OsType::Linux | OsType::Macos)
    }

    /// Android or iOS.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(self.os, OsType::Android | OsType::Ios)
    }

    /// No native OS access.
    #[must_use]
    pub const fn is_web(&self) -> bool {
        matches!(self.os, OsType::Web)
    }

    /// Whether the application can replace its own binary.
    #[must_use]
    pub const fn supports_self_update(&self) -> bool {
        self.is_desktop()
    }

    /// Whether a directory (rather than a file) can be picked by the user.
    ///
    /// Without a directory picker the user picks a file and its parent
    /// directory is used.
    #[must_use]
    pub const fn supports_directory_picker(&self) -> bool {
        self.is_desktop()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
