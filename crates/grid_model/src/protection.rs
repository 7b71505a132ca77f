//! Cell and sheet protection settings

use serde::{Deserialize, Serialize};

/// Per-cell protection flags.
///
/// Spreadsheet applications default to locked, visible cells; the flags only
/// take effect once the sheet itself is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellProtection {
    pub locked: bool,
    pub hidden: bool,
}

impl Default for CellProtection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

impl CellProtection {
    /// Editable once the sheet is protected
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            hidden: false,
        }
    }

    /// Read-only once the sheet is protected
    pub fn locked() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

/// Sheet-level protection.
///
/// Protection is only ever switched on without a password, so no password
/// is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetProtection {
    pub enabled: bool,
}

impl SheetProtection {
    /// Protection switched on, no password
    pub fn enabled() -> Self {
        Self { enabled: true }
    }
}
