//! # Grants
//!
//! A coarse capability model used to gate API operations. Each named grant
//! occupies one bit of a [`Grant`] mask, in declaration order starting at
//! bit 0. Masks from several roles are combined with bitwise OR.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{RbacError, RbacResult};

/// A bitmask of API capabilities.
///
/// Serializes as its integer value; an absent value deserializes to
/// [`Grant::NONE`].
///
/// # Example
///
/// ```
/// use kvdi_rbac::Grant;
///
/// let grant = Grant::WRITE_USERS | Grant::READ_USERS;
/// assert!(grant.has(Grant::READ_USERS));
/// assert_eq!(grant.names(), vec!["ReadUsers", "WriteUsers"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grant(u32);

impl Grant {
    /// No capabilities.
    pub const NONE: Grant = Grant(0);
    /// Read users.
    pub const READ_USERS: Grant = Grant(1 << 0);
    /// Create, update, and delete users.
    pub const WRITE_USERS: Grant = Grant(1 << 1);
    /// Read roles.
    pub const READ_ROLES: Grant = Grant(1 << 2);
    /// Create, update, and delete roles.
    pub const WRITE_ROLES: Grant = Grant(1 << 3);
    /// Read desktop templates.
    pub const READ_TEMPLATES: Grant = Grant(1 << 4);
    /// Create, update, and delete desktop templates.
    pub const WRITE_TEMPLATES: Grant = Grant(1 << 5);
    /// Launch sessions from desktop templates.
    pub const LAUNCH_TEMPLATES: Grant = Grant(1 << 6);
    /// Read running desktop sessions.
    pub const READ_DESKTOP_SESSIONS: Grant = Grant(1 << 7);
    /// Union of every named grant.
    pub const ALL: Grant = Grant(
        Self::READ_USERS.0
            | Self::WRITE_USERS.0
            | Self::READ_ROLES.0
            | Self::WRITE_ROLES.0
            | Self::READ_TEMPLATES.0
            | Self::WRITE_TEMPLATES.0
            | Self::LAUNCH_TEMPLATES.0
            | Self::READ_DESKTOP_SESSIONS.0,
    );

    /// Named grants indexed by bit position.
    const NAMES: [(Grant, &'static str); 8] = [
        (Self::READ_USERS, "ReadUsers"),
        (Self::WRITE_USERS, "WriteUsers"),
        (Self::READ_ROLES, "ReadRoles"),
        (Self::WRITE_ROLES, "WriteRoles"),
        (Self::READ_TEMPLATES, "ReadTemplates"),
        (Self::WRITE_TEMPLATES, "WriteTemplates"),
        (Self::LAUNCH_TEMPLATES, "LaunchTemplates"),
        (Self::READ_DESKTOP_SESSIONS, "ReadDesktopSessions"),
    ];

    /// Create a grant from a raw mask. Bits above the named grants are kept.
    pub const fn from_bits(bits: u32) -> Self {
        Grant(bits)
    }

    /// Get the raw mask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check if any bit of `grant` is set in this mask.
    ///
    /// This is non-strict for composite masks: `Grant::READ_USERS.has(Grant::ALL)`
    /// is `true`. Use [`Grant::contains_all`] when every bit must be present.
    pub fn has(self, grant: Grant) -> bool {
        self.0 & grant.0 != 0
    }

    /// Check if every bit of `grant` is set in this mask.
    pub fn contains_all(self, grant: Grant) -> bool {
        self.0 & grant.0 == grant.0
    }

    /// Check if no bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the names of the set grants, in bit order.
    ///
    /// For display and auditing only.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(grant, _)| self.has(*grant))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Look up a single named grant.
    ///
    /// # Example
    ///
    /// ```
    /// use kvdi_rbac::Grant;
    ///
    /// assert_eq!(Grant::from_name("LaunchTemplates"), Some(Grant::LAUNCH_TEMPLATES));
    /// assert_eq!(Grant::from_name("All"), Some(Grant::ALL));
    /// assert_eq!(Grant::from_name("launchtemplates"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "All" {
            return Some(Self::ALL);
        }
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(grant, _)| *grant)
    }

    /// Build a mask from a list of grant names.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::UnknownGrant`] for the first name not in the table.
    pub fn from_names<I, S>(names: I) -> RbacResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(Self::NONE, |acc, name| {
            let name = name.as_ref();
            Self::from_name(name)
                .map(|grant| acc | grant)
                .ok_or_else(|| RbacError::UnknownGrant(name.to_string()))
        })
    }
}

impl BitOr for Grant {
    type Output = Grant;

    fn bitor(self, rhs: Grant) -> Grant {
        Grant(self.0 | rhs.0)
    }
}

impl BitOrAssign for Grant {
    fn bitor_assign(&mut self, rhs: Grant) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Grant> for Grant {
    fn from_iter<T: IntoIterator<Item = Grant>>(iter: T) -> Self {
        iter.into_iter().fold(Grant::NONE, BitOr::bitor)
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}
