//! Contract tests for best-effort check registration.
//!
//! Run against the in-memory platform; any conforming platform must
//! observe the same call ordering.

use bardeval_core::fakes::{MemoryPlatform, PlatformCall};
use bardeval_core::{CheckConfig, CheckDescriptor, CheckRegistrar, FlowError, PROJECT_NAME};

fn project_id(platform: &MemoryPlatform) -> String {
    platform.project_id(PROJECT_NAME).unwrap()
}

#[tokio::test]
async fn promptless_check_generates_before_upsert() {
    let platform = MemoryPlatform::new();
    let pid = project_id(&platform);
    let registrar = CheckRegistrar::new(&platform, &pid);

    let report = registrar
        .register_all(&[CheckDescriptor::generated(
            "custom.Length",
            "Score how concise the output is.",
        )])
        .await;

    assert!(report.is_complete());
    let calls = platform.calls();
    let generate = calls
        .iter()
        .position(|c| *c == PlatformCall::GenerateCheck("custom.Length".to_string()))
        .expect("generation requested");
    let upsert = calls
        .iter()
        .position(|c| *c == PlatformCall::UpsertCheck("custom.Length".to_string()))
        .expect("upsert made");
    assert!(generate < upsert);

    let stored = platform.check("custom.Length").unwrap();
    assert!(matches!(stored.config, CheckConfig::Code { .. }));
}

#[tokio::test]
async fn prompted_check_is_uploaded_verbatim_without_generation() {
    let platform = MemoryPlatform::new();
    let pid = project_id(&platform);
    let prompt = "Rate how archaic this is, 1 to 5:\n{output}\nScore:";

    let report = CheckRegistrar::new(&platform, &pid)
        .register_all(&[CheckDescriptor::prompted(
            "custom.Archaic",
            "archaic",
            prompt,
        )])
        .await;

    assert_eq!(report.registered.len(), 1);
    assert!(!platform
        .calls()
        .iter()
        .any(|c| matches!(c, PlatformCall::GenerateCheck(_))));
    match platform.check("custom.Archaic").unwrap().config {
        CheckConfig::Prompt {
            prompt_template, ..
        } => assert_eq!(prompt_template, prompt),
        other => panic!("expected prompt config, got {:?}", other),
    }
}

#[tokio::test]
async fn failure_on_one_check_does_not_stop_the_rest() {
    let platform = MemoryPlatform::new().fail_check("custom.B");
    let pid = project_id(&platform);
    let checks = vec![
        CheckDescriptor::prompted("custom.A", "a", "{output}"),
        CheckDescriptor::prompted("custom.B", "b", "{output}"),
        CheckDescriptor::prompted("custom.C", "c", "{output}"),
        CheckDescriptor::generated("custom.D", "d"),
    ];

    let report = CheckRegistrar::new(&platform, &pid)
        .register_all(&checks)
        .await;

    assert_eq!(report.failed_names(), vec!["custom.B".to_string()]);
    let registered: Vec<_> = report.registered.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(registered, vec!["custom.A", "custom.C", "custom.D"]);

    let upserts: Vec<_> = platform
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            PlatformCall::UpsertCheck(name) => Some(name),
            _ => None,
        })
        .collect();
    assert_eq!(upserts, vec!["custom.A", "custom.B", "custom.C", "custom.D"]);
}

#[tokio::test]
async fn empty_generated_code_fails_only_that_check() {
    let platform = MemoryPlatform::new().with_generated_code("   ");
    let pid = project_id(&platform);
    let registrar = CheckRegistrar::new(&platform, &pid);

    let err = registrar
        .register(&CheckDescriptor::generated("custom.Empty", "nothing"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::EmptyGeneratedCheck { .. }));
    assert!(platform.check("custom.Empty").is_none());

    let report = registrar
        .register_all(&[
            CheckDescriptor::generated("custom.Empty", "nothing"),
            CheckDescriptor::prompted("custom.Poetic", "poetic", "{output}"),
        ])
        .await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.registered.len(), 1);
}

#[tokio::test]
async fn reregistering_updates_in_place() {
    let platform = MemoryPlatform::new();
    let pid = project_id(&platform);
    let registrar = CheckRegistrar::new(&platform, &pid);

    let first = registrar
        .register(&CheckDescriptor::prompted("custom.Poetic", "v1", "old {output}"))
        .await
        .unwrap();
    let second = registrar
        .register(&CheckDescriptor::prompted("custom.Poetic", "v2", "new {output}"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(platform.checks().len(), 1);
    assert_eq!(platform.check("custom.Poetic").unwrap().description, "v2");
}
