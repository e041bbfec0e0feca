//! Queries against a small enterprise bundle

use amos_attack::{
    related_to, AttackDataset, AttackError, Coverage, CoverageMatrix, DependencyGraph,
};
use amos_test_utils::STIX_BUNDLE_JSON;
use pretty_assertions::assert_eq;

fn dataset() -> AttackDataset {
    AttackDataset::from_json(STIX_BUNDLE_JSON).unwrap()
}

#[test]
fn load_reads_bundle_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enterprise-attack.json");
    std::fs::write(&path, STIX_BUNDLE_JSON).unwrap();

    let data = AttackDataset::load(&path).unwrap();
    assert_eq!(data.objects().len(), 9);
    assert_eq!(data.attack_patterns().count(), 7);
}

#[test]
fn load_errors_keep_context() {
    let missing = AttackDataset::load("/nonexistent/enterprise-attack.json").unwrap_err();
    assert!(matches!(missing, AttackError::Io { .. }));

    let malformed = AttackDataset::from_json("{\"objects\": 3}").unwrap_err();
    assert!(matches!(malformed, AttackError::Bundle(_)));
}

#[test]
fn matrix_renders_columns_and_counts() {
    let mut coverage = Coverage::new();
    coverage.add_built("T1082", "ttp/discovery/shell/system_info.sh");
    coverage.add_planned("T1555");

    let page = CoverageMatrix::new("macOS").render(&dataset(), &coverage);

    assert!(page.starts_with("<div align=\"center\">\n\n# **macOS Attack Procedure Matrix**\n\n"));
    assert!(page.contains("Technique%20Coverage-1%20(20.00%25)-grey"));
    assert!(page.contains("Known%20Techniques-5-red"));
    assert!(page.contains("Procedure%20Coverage-1%20(1.00%25)-grey"));
    assert!(page.contains("Estimated%20Known%20Procedures-100-grey"));
    assert!(page.contains(
        "| Initial Access | Execution | Persistence | Privilege Escalation | Defense Evasion | Credential Access | Discovery | Lateral Movement | Collection | Command and Control | Exfiltration | Impact |\n| --- | --- | --- | --- | --- | --- | --- | --- | --- | --- | --- | --- |\n"
    ));

    let rows: Vec<&str> = page
        .lines()
        .filter(|l| l.starts_with("| ") && !l.starts_with("| Initial") && !l.starts_with("| ---"))
        .collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].contains("![[T1082](../../ttp/discovery/shell/system_info.sh)]"));
    assert!(rows[0].contains("T1555-lightgrey?style=for-the-badge&label=%20!%20"));
    assert!(rows[1].contains("<sub>Setuid and Setgid</sub>"));
    assert!(!page.contains("Old Technique"));

    assert!(page.contains(
        "\n## Technique Counts per Tactic\n- Initial Access: 1\n- Execution: 1\n- Persistence: 1\n- Privilege Escalation: 2\n- Defense Evasion: 2\n- Credential Access: 1\n- Discovery: 1\n"
    ));
}

#[test]
fn matrix_overlay_merges_with_project_coverage() {
    let overlay = Coverage::from_toml("coverage.toml", "[green]\n\"T1078\" = 2\n").unwrap();
    let mut coverage = Coverage::new();
    coverage.add_built("T1082", "ttp/discovery/shell/system_info.sh");
    coverage.merge(overlay);

    let stats = CoverageMatrix::default().stats(&dataset(), &coverage);
    assert_eq!(stats.implemented_techniques, 2);
    assert_eq!(stats.implemented_procedures, 3);
}

#[test]
fn dependency_graph_ranks_targets() {
    let graph = DependencyGraph::build(&dataset());
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.top_by_in_degree(5), vec![("T1059", 1)]);
    assert_eq!(graph.predecessors("T1059"), vec!["T1082"]);
    assert_eq!(graph.name("T1082"), Some("System Information Discovery"));
    assert_eq!(graph.in_degree("T1082"), 0);
}

#[test]
fn related_techniques_split_known_and_unknown() {
    let report = related_to(&dataset(), "T1078").unwrap();
    assert_eq!(report.target_name, "Valid Accounts");

    let found: Vec<(&str, &str)> = report
        .known
        .iter()
        .map(|r| (r.technique.as_str(), r.phrase))
        .collect();
    assert_eq!(found, vec![("T1548.001", "uses"), ("T1548.001", "often uses")]);
    assert_eq!(report.unknown.iter().collect::<Vec<_>>(), vec!["T9999"]);
    assert_eq!(report.total, 1);

    assert!(related_to(&dataset(), "T4242").is_none());
}
