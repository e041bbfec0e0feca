//! Testing utilities for amos workspace
//!
//! Shared fixtures and a scaffolded project tree.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Procedure exercising every argument kind, a sudo function and the FDA check
pub const SAMPLE_PROCEDURE_YAML: &str = r#"procedure_name: system_info
ttp_id: T1082
tactic: Discovery
guid: $GUID
intent: Collect system information from the host
author: "@darmado"
created: "2025-05-30"
updated: $UPDATED
version: 1.0.0
procedure:
  arguments:
    - option: "-b|--basic"
      description: "Collect basic system information"
      execute_function:
        - collect_basic
    - option: "--output-file"
      description: "Write results to the given file path"
      type: string
    - option: "-t|--timeout"
      description: "Timeout in seconds"
      type: integer
      execute_function:
        - apply_timeout
    - option: "--users"
      description: "List local users"
      execute_function:
        - list_users
  global_variable:
    - name: DEFAULT_TIMEOUT
      type: integer
      default_value: 30
    - name: REPORT_TITLE
      type: string
      default_value: "System Report"
    - name: PROBES
      type: array
      array_elements:
        - hostname
        - uname
  functions:
    - name: collect_basic
      type: main
      language:
        - shell
      code: |
        collect_basic() {
            $CMD_PRINTF "HOST|%s\n" "$($CMD_HOSTNAME)"
        }
    - name: apply_timeout
      code: |
        apply_timeout() {
            $CMD_PRINTF "TIMEOUT|%s\n" "$TIMEOUT_ARG"
        }
    - name: list_users
      sudo_required: true
      opsec:
        check_fda:
          enabled: true
          exit_on_failure: true
      code: |
        list_users() {
            users=$("$CMD_DSCL" . -list /Users)
            $CMD_PRINTF "USERS|%s\n" "$users"
        }
"#;

/// A procedure with a stamped GUID and date, as after a first build
pub const STAMPED_PROCEDURE_YAML: &str = r#"procedure_name: firewall_state
ttp_id: T1562.004
tactic: Defense Evasion
guid: 6f1d0f6e-3c1e-4a52-9d3f-0b7c9a1c2e11
intent: Report application firewall state
author: "@darmado"
created: "2025-05-30"
updated: '2025-06-01'
version: 1.2.3
procedure:
  arguments:
    - option: "--state"
      description: "Show firewall state"
      execute_function:
        - firewall_state
  functions:
    - name: firewall_state
      code: |
        firewall_state() {
            $CMD_PRINTF "STATE|%s\n" "$($CMD_DEFAULTS read /Library/Preferences/com.apple.alf globalstate)"
        }
"#;

/// A LOOBins catalog entry with two use cases
pub const LOOBIN_YAML: &str = r#"name: Networksetup
author: Chris Campbell (@texasbe2trill)
short_description: Configure network settings.
full_description: The networksetup binary configures network settings on macOS.
created: 2023-05-22
example_use_cases:
  - name: Enable a web proxy
    description: Configure a web proxy for the Wi-Fi network service so traffic is routed through an attacker controlled host.
    code: networksetup -setwebproxy Wi-Fi 127.0.0.1 8080
    tactics:
      - Command and Control
    tags:
      - proxy
  - name: List network services
    description: List all network services.
    code: networksetup -listallnetworkservices
    tactics:
      - Discovery
paths:
  - /usr/sbin/networksetup
detections:
  - name: Jamf Protect detection
    url: https://github.com/jamf/jamfprotect
  - name: No public detection
    url: N/A
resources:
  - name: networksetup man page
    url: https://ss64.com/osx/networksetup.html
"#;

/// Minimal ATT&CK STIX bundle
///
/// - T1082 relies on T1059 (one dependency edge)
/// - T1548.001 uses Valid Accounts, T1555 cites the unknown T9999
/// - T1000 is revoked and T1001 deprecated
pub const STIX_BUNDLE_JSON: &str = r#"{
  "type": "bundle",
  "id": "bundle--0001",
  "objects": [
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1082",
      "name": "System Information Discovery",
      "description": "An adversary may attempt to get detailed information about the host. [System Information Discovery](https://attack.mitre.org/techniques/T1082) relies on [Command and Scripting Interpreter](https://attack.mitre.org/techniques/T1059).",
      "x_mitre_platforms": ["macOS", "Linux", "Windows"],
      "kill_chain_phases": [{"kill_chain_name": "mitre-attack", "phase_name": "discovery"}],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1082", "url": "https://attack.mitre.org/techniques/T1082"}]
    },
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1059",
      "name": "Command and Scripting Interpreter",
      "description": "Adversaries may abuse command and script interpreters to execute commands.",
      "x_mitre_platforms": ["macOS", "Windows"],
      "kill_chain_phases": [{"kill_chain_name": "mitre-attack", "phase_name": "execution"}],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1059"}]
    },
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1078",
      "name": "Valid Accounts",
      "description": "Adversaries may obtain and abuse credentials of existing accounts.",
      "x_mitre_platforms": ["macOS", "Linux", "Windows"],
      "kill_chain_phases": [
        {"kill_chain_name": "mitre-attack", "phase_name": "defense-evasion"},
        {"kill_chain_name": "mitre-attack", "phase_name": "persistence"},
        {"kill_chain_name": "mitre-attack", "phase_name": "privilege-escalation"},
        {"kill_chain_name": "mitre-attack", "phase_name": "initial-access"}
      ],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1078"}]
    },
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1548-001",
      "name": "Setuid and Setgid",
      "description": "Adversaries may abuse setuid binaries. This is related to T1078 which often uses [Valid Accounts](https://attack.mitre.org/techniques/T1078).",
      "x_mitre_platforms": ["macOS", "Linux"],
      "x_mitre_is_subtechnique": true,
      "kill_chain_phases": [
        {"kill_chain_name": "mitre-attack", "phase_name": "privilege-escalation"},
        {"kill_chain_name": "mitre-attack", "phase_name": "defense-evasion"}
      ],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1548.001"}]
    },
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1555",
      "name": "Credentials from Password Stores",
      "description": "Adversaries may search the Keychain for credentials.\nSometimes T9999 leverages [Valid Accounts](https://attack.mitre.org/techniques/T1078) afterwards.",
      "x_mitre_platforms": ["macOS"],
      "kill_chain_phases": [{"kill_chain_name": "mitre-attack", "phase_name": "credential-access"}],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1555"}]
    },
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1000",
      "name": "Old Technique",
      "description": "Revoked keychain technique.",
      "x_mitre_platforms": ["macOS"],
      "revoked": true,
      "kill_chain_phases": [{"kill_chain_name": "mitre-attack", "phase_name": "discovery"}],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1000"}]
    },
    {
      "type": "attack-pattern",
      "id": "attack-pattern--1001",
      "name": "Deprecated Technique",
      "description": "Deprecated technique.",
      "x_mitre_platforms": ["macOS"],
      "x_mitre_deprecated": true,
      "kill_chain_phases": [{"kill_chain_name": "mitre-attack", "phase_name": "discovery"}],
      "external_references": [{"source_name": "mitre-attack", "external_id": "T1001"}]
    },
    {
      "type": "malware",
      "id": "malware--0001",
      "name": "Keychain Stealer",
      "description": "Malware that dumps the login keychain."
    },
    {
      "type": "relationship",
      "id": "relationship--0001",
      "relationship_type": "uses",
      "source_ref": "malware--0001",
      "target_ref": "attack-pattern--1555"
    }
  ]
}"#;

/// Relative locations inside a scaffolded project
pub const CONFIG_DIR: &str = "attackmacos/core/config";
pub const TTP_DIR: &str = "attackmacos/ttp";

/// Temporary project tree with the standard layout
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Create an empty project with the config and TTP folders in place
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::create_dir_all(dir.path().join(TTP_DIR)).unwrap();
        Self { dir }
    }

    /// Create a project holding the sample procedure
    pub fn with_sample() -> Self {
        let project = Self::new();
        project.write_procedure("system_info.yml", SAMPLE_PROCEDURE_YAML);
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root().join(CONFIG_DIR)
    }

    /// Write a procedure YAML into the config dir
    pub fn write_procedure(&self, file_name: &str, yaml: &str) -> PathBuf {
        let path = self.config_dir().join(file_name);
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Write any file relative to the project root
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `program` can be spawned from PATH
pub fn has_program(program: &str) -> bool {
    std::process::Command::new(program)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok()
}
