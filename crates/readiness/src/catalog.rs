use shared::domain::{
    CompanyInfo, ControlArea, ControlDefinition, ReadinessSnapshot,
};

const fn control(id: &'static str, area: ControlArea, label: &'static str) -> ControlDefinition {
    ControlDefinition { id, area, label }
}

/// Cyber Essentials controls in display and export order.
///
/// Ids are a persisted contract: renaming or removing one invalidates every
/// stored snapshot.
const CONTROLS: &[ControlDefinition] = &[
    control(
        "fw1",
        ControlArea::Firewalls,
        "Boundary firewall configured and rules documented",
    ),
    control(
        "fw2",
        ControlArea::Firewalls,
        "No unnecessary ports/services exposed to the internet",
    ),
    control(
        "sc1",
        ControlArea::SecureConfiguration,
        "Default passwords changed on all devices and software",
    ),
    control(
        "sc2",
        ControlArea::SecureConfiguration,
        "Unnecessary software and services removed or disabled",
    ),
    control(
        "ua1",
        ControlArea::UserAccessControl,
        "Admin accounts used only for admin tasks (not email/browsing)",
    ),
    control(
        "ua2",
        ControlArea::UserAccessControl,
        "MFA enabled for all remote and privileged access",
    ),
    control(
        "ua3",
        ControlArea::UserAccessControl,
        "Password policy enforced: min 8 chars, no shared/default passwords",
    ),
    control(
        "mp1",
        ControlArea::MalwareProtection,
        "Antivirus/anti-malware active and updating on all devices",
    ),
    control(
        "pm1",
        ControlArea::PatchManagement,
        "OS patches applied within 14 days of release",
    ),
    control(
        "pm2",
        ControlArea::PatchManagement,
        "Application patches applied within 14 days of release",
    ),
];

pub struct ControlCatalog;

impl ControlCatalog {
    pub fn controls() -> &'static [ControlDefinition] {
        CONTROLS
    }

    pub fn len() -> usize {
        CONTROLS.len()
    }

    /// Fresh snapshot: empty company, every control not started.
    pub fn defaults() -> ReadinessSnapshot {
        ReadinessSnapshot {
            company: CompanyInfo::default(),
            controls: CONTROLS
                .iter()
                .map(ControlDefinition::initial_state)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use shared::domain::ControlStatus;

    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = ControlCatalog::controls().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), ControlCatalog::len());
    }

    #[test]
    fn catalog_is_never_empty() {
        assert_eq!(ControlCatalog::len(), 10);
    }

    #[test]
    fn defaults_follow_catalog_order() {
        let defaults = ControlCatalog::defaults();
        assert_eq!(defaults.company, CompanyInfo::default());
        let ids: Vec<_> = defaults.controls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            ["fw1", "fw2", "sc1", "sc2", "ua1", "ua2", "ua3", "mp1", "pm1", "pm2"]
        );
        assert!(defaults
            .controls
            .iter()
            .all(|c| c.status == ControlStatus::NotStarted && c.notes.is_empty()));
    }
}
