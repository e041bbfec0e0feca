//! ATT&CK enterprise tactics
//!
//! Procedures name their tactic in display form (`Defense Evasion`), the
//! STIX dataset uses kill-chain phase names (`defense-evasion`), and the
//! output tree uses snake_case folders (`defense_evasion`).

use std::fmt;
use std::str::FromStr;

/// An ATT&CK tactic
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tactic {
    InitialAccess,
    Execution,
    Persistence,
    PrivilegeEscalation,
    DefenseEvasion,
    CredentialAccess,
    Discovery,
    LateralMovement,
    Collection,
    CommandAndControl,
    Exfiltration,
    Impact,
    /// Tactic outside the known set, kept as written
    Other(String),
}

impl Tactic {
    /// Known tactics in matrix column order
    pub const MATRIX_ORDER: [Tactic; 12] = [
        Tactic::InitialAccess,
        Tactic::Execution,
        Tactic::Persistence,
        Tactic::PrivilegeEscalation,
        Tactic::DefenseEvasion,
        Tactic::CredentialAccess,
        Tactic::Discovery,
        Tactic::LateralMovement,
        Tactic::Collection,
        Tactic::CommandAndControl,
        Tactic::Exfiltration,
        Tactic::Impact,
    ];

    /// Parse a display name or kill-chain phase name, case-insensitively
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace(['-', '_'], " ");
        Self::MATRIX_ORDER
            .iter()
            .find(|t| t.display_name().to_lowercase() == normalized)
            .cloned()
            .unwrap_or_else(|| Tactic::Other(name.trim().to_string()))
    }

    /// Parse a STIX kill-chain phase name (`defense-evasion`)
    #[inline]
    #[must_use]
    pub fn from_phase_name(phase: &str) -> Self {
        Self::from_name(phase)
    }

    /// Display name as used in procedure YAML
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Tactic::InitialAccess => "Initial Access",
            Tactic::Execution => "Execution",
            Tactic::Persistence => "Persistence",
            Tactic::PrivilegeEscalation => "Privilege Escalation",
            Tactic::DefenseEvasion => "Defense Evasion",
            Tactic::CredentialAccess => "Credential Access",
            Tactic::Discovery => "Discovery",
            Tactic::LateralMovement => "Lateral Movement",
            Tactic::Collection => "Collection",
            Tactic::CommandAndControl => "Command and Control",
            Tactic::Exfiltration => "Exfiltration",
            Tactic::Impact => "Impact",
            Tactic::Other(name) => name,
        }
    }

    /// STIX kill-chain phase name
    #[must_use]
    pub fn phase_name(&self) -> String {
        self.display_name().to_lowercase().replace(' ', "-")
    }

    /// Output folder name under the TTP tree
    #[must_use]
    pub fn directory(&self) -> String {
        self.display_name().to_lowercase().replace(' ', "_")
    }
}

impl Default for Tactic {
    fn default() -> Self {
        Tactic::Discovery
    }
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Tactic {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_mapping() {
        assert_eq!(Tactic::from_name("Defense Evasion").directory(), "defense_evasion");
        assert_eq!(Tactic::from_name("Command and Control").directory(), "command_and_control");
        assert_eq!(Tactic::from_name("Discovery").directory(), "discovery");
    }

    #[test]
    fn accepts_phase_names() {
        assert_eq!(Tactic::from_name("credential-access"), Tactic::CredentialAccess);
        assert_eq!(Tactic::from_phase_name("command-and-control"), Tactic::CommandAndControl);
        assert_eq!(Tactic::CommandAndControl.phase_name(), "command-and-control");
    }

    #[test]
    fn unknown_tactic_falls_back_to_snake_case() {
        let tactic = Tactic::from_name("Resource Development");
        assert_eq!(tactic, Tactic::Other("Resource Development".to_string()));
        assert_eq!(tactic.directory(), "resource_development");
    }
}
