use crate::types::{EventOccurrence, Visibility};

/// Set of visibility levels a feed run may expose.
///
/// Public is always allowed. Confidential and Private are granted only
/// for a named non-public calendar, from the owner's remote-access
/// preference: level 1 adds Confidential, level 2 adds Private as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed: Vec<Visibility>,
}

impl AccessPolicy {
    /// Public entries only. The safe default.
    pub fn public_only() -> Self {
        Self {
            allowed: vec![Visibility::Public],
        }
    }

    /// Policy for a calendar with the given remote-access level.
    ///
    /// The public calendar never gets elevated access, whatever the
    /// stored level says.
    pub fn from_remote_access(level: u8, subject_is_public: bool) -> Self {
        let mut allowed = vec![Visibility::Public];

        if !subject_is_public {
            if level >= 1 {
                allowed.push(Visibility::Confidential);
            }
            if level == 2 {
                allowed.push(Visibility::Private);
            }
        }

        Self { allowed }
    }

    pub fn is_visible(&self, occurrence: &EventOccurrence) -> bool {
        self.allowed.contains(&occurrence.visibility)
    }

    pub fn allows(&self, visibility: Visibility) -> bool {
        self.allowed.contains(&visibility)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::public_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_only_blocks_elevated() {
        let policy = AccessPolicy::public_only();
        assert!(policy.allows(Visibility::Public));
        assert!(!policy.allows(Visibility::Confidential));
        assert!(!policy.allows(Visibility::Private));
    }

    #[test]
    fn level_one_adds_confidential() {
        let policy = AccessPolicy::from_remote_access(1, false);
        assert!(policy.allows(Visibility::Public));
        assert!(policy.allows(Visibility::Confidential));
        assert!(!policy.allows(Visibility::Private));
    }

    #[test]
    fn level_two_adds_private() {
        let policy = AccessPolicy::from_remote_access(2, false);
        assert!(policy.allows(Visibility::Confidential));
        assert!(policy.allows(Visibility::Private));
    }

    #[test]
    fn public_calendar_is_never_elevated() {
        let policy = AccessPolicy::from_remote_access(2, true);
        assert!(policy.allows(Visibility::Public));
        assert!(!policy.allows(Visibility::Confidential));
        assert!(!policy.allows(Visibility::Private));
    }

    #[test]
    fn unknown_levels_stay_public_plus_confidential() {
        let policy = AccessPolicy::from_remote_access(7, false);
        assert!(policy.allows(Visibility::Confidential));
        assert!(!policy.allows(Visibility::Private));
    }
}
