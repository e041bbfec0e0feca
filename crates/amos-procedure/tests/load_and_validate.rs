use amos_procedure::{
    load_procedure, ArgumentKind, ProcedureSchema, ProcedureSource, Tactic, VariableType,
};
use amos_test_utils::{TestProject, SAMPLE_PROCEDURE_YAML, STAMPED_PROCEDURE_YAML};

#[test]
fn sample_procedure_loads_and_validates() {
    let project = TestProject::with_sample();
    let path = project.config_dir().join("system_info.yml");

    let source = ProcedureSource::load(&path).unwrap();
    let report = ProcedureSchema::embedded().unwrap().validate(source.value());
    assert!(report.is_valid(), "{:?}", report.violations);

    let procedure = source.to_procedure().unwrap();
    assert_eq!(procedure.name(), "system_info");
    assert!(procedure.has_guid_placeholder());
    assert!(procedure.requires_fda_check());

    let kinds: Vec<_> = procedure.arguments().iter().map(|a| a.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ArgumentKind::ActionOnly,
            ArgumentKind::InputOnly,
            ArgumentKind::Dual,
            ArgumentKind::ActionOnly
        ]
    );

    let globals: Vec<_> = procedure.global_variables().iter().map(|g| g.var_type).collect();
    assert_eq!(globals, vec![VariableType::Integer, VariableType::String, VariableType::Array]);
}

#[test]
fn stamped_procedure_is_valid_and_typed() {
    let project = TestProject::new();
    let path = project.write_procedure("firewall_state.yml", STAMPED_PROCEDURE_YAML);

    let procedure = load_procedure(&path).unwrap();
    assert_eq!(procedure.tactic(), Tactic::DefenseEvasion);
    assert_eq!(procedure.tactic().directory(), "defense_evasion");
    assert_eq!(procedure.updated(), "2025-06-01");
    assert_eq!(procedure.version(), "1.2.3");
    assert!(!procedure.has_guid_placeholder());
}

#[test]
fn unknown_top_level_keys_do_not_break_the_model() {
    let yaml = format!("{SAMPLE_PROCEDURE_YAML}x_custom: true\n");
    let source = ProcedureSource::parse("custom.yml", yaml).unwrap();
    assert!(source.to_procedure().is_ok());
}
