//! Integration tests for the generation pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use smith_templates::{
    Configuration, EngineConfig, GenerationStep, Generator, SchemaValidator, SmithError,
    ENV_FILE, SCHEMA_FILE,
};
use tempfile::{tempdir, TempDir};
use walkdir::WalkDir;

fn get_templates_path() -> PathBuf {
    let candidates = ["templates", "../templates", "../../templates"];
    for candidate in candidates {
        if Path::new(candidate).join("fastmcp_base").exists() {
            return PathBuf::from(candidate);
        }
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn write(path: &Path, content: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn config(value: Value) -> Configuration {
    Configuration::from_value(value).unwrap()
}

/// Templates root with a few fixture templates.
fn fixture_root() -> TempDir {
    let root = tempdir().unwrap();
    let r = root.path();

    write(&r.join("assets_only/README.md"), "# {{ not rendered }}\n");
    write(&r.join("assets_only/logo.png"), [0x89u8, b'P', b'N', b'G', 0, 255]);
    write(&r.join("assets_only/docs/guide.txt"), "guide\n");
    write(&r.join("assets_only/config_schema.json"), "{}");

    write(
        &r.join("with_required/config_schema.json"),
        r#"{"required": ["doc_url"], "properties": {"credentials": {"required": ["api_key"]}}}"#,
    );
    write(&r.join("with_required/main.py"), "DOC_URL = \"{{ doc_url }}\"\nMISSING = \"{{ nope }}\"\n");

    write(&r.join("no_schema/main.py"), "NAME = \"{{ name }}\"\n");

    root
}

fn generator(root: &Path) -> Generator {
    Generator::new(EngineConfig::new(root)).unwrap()
}

fn tree(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn count_entries(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn test_no_schema_accepts_any_configuration() {
    let root = fixture_root();
    let template = root.path().join("no_schema");
    let validator = SchemaValidator::new();

    assert!(validator.validate(&template, &Configuration::new()));
    assert!(validator.validate(&template, &config(json!({"anything": [1, 2, 3]}))));
}

#[test]
fn test_required_top_level_key() {
    let root = fixture_root();
    let template = root.path().join("with_required");
    let validator = SchemaValidator::new();
    let creds = json!({"api_key": "abc"});

    assert!(!validator.validate(&template, &config(json!({"credentials": creds}))));
    for value in [json!("https://x"), json!(null), json!({"nested": true}), json!([1])] {
        let cfg = config(json!({"doc_url": value, "credentials": creds}));
        assert!(validator.validate(&template, &cfg));
    }
}

#[test]
fn test_required_credential_key() {
    let root = fixture_root();
    let template = root.path().join("with_required");
    let validator = SchemaValidator::new();

    assert!(!validator.validate(&template, &config(json!({"doc_url": "u"}))));
    assert!(!validator.validate(&template, &config(json!({"doc_url": "u", "credentials": {}}))));
    assert!(!validator.validate(&template, &config(json!({"doc_url": "u", "api_key": "abc"}))));
    assert!(validator.validate(
        &template,
        &config(json!({"doc_url": "u", "credentials": {"api_key": "abc"}}))
    ));
}

#[test]
fn test_assets_only_round_trip() {
    let root = fixture_root();
    let out = tempdir().unwrap();

    let output = generator(root.path())
        .generate("assets_only", &Configuration::new(), Some(out.path()))
        .unwrap();

    let mut expected = tree(&root.path().join("assets_only"));
    expected.remove(Path::new(SCHEMA_FILE));
    let mut actual = tree(out.path());
    assert_eq!(actual.remove(Path::new(ENV_FILE)), Some(Vec::new()));
    assert_eq!(actual, expected);

    assert!(output.rendered.is_empty());
    assert_eq!(output.copied.len(), 3);
    assert_eq!(output.path, fs::canonicalize(out.path()).unwrap());
}

#[test]
fn test_two_outputs_are_identical() {
    let root = fixture_root();
    let (a, b) = (tempdir().unwrap(), tempdir().unwrap());
    let cfg = config(json!({
        "doc_url": "https://jina.ai/deepsearch",
        "credentials": {"api_key": "abc", "nested": {"a": 1}},
        "settings": {"retries": 2}
    }));

    let generator = generator(root.path());
    let first = generator.generate("with_required", &cfg, Some(a.path())).unwrap();
    let second = generator.generate("with_required", &cfg, Some(b.path())).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(tree(a.path()), tree(b.path()));
}

#[test]
fn test_renderer_substitution() {
    let root = fixture_root();
    let out = tempdir().unwrap();
    let cfg = config(json!({"doc_url": "https://docs.example", "credentials": {"api_key": "k"}}));

    let output = generator(root.path())
        .generate("with_required", &cfg, Some(out.path()))
        .unwrap();

    let main = fs::read_to_string(out.path().join("main.py")).unwrap();
    assert!(main.contains("DOC_URL = \"https://docs.example\""));
    assert!(main.contains("MISSING = \"\""));
    assert_eq!(output.rendered, vec![PathBuf::from("main.py")]);
}

#[test]
fn test_env_emission() {
    let root = fixture_root();
    let out = tempdir().unwrap();
    let cfg = config(json!({"credentials": {"api_key": "abc", "nested": {"a": 1}}}));

    generator(root.path())
        .generate("no_schema", &cfg, Some(out.path()))
        .unwrap();

    let env = fs::read_to_string(out.path().join(ENV_FILE)).unwrap();
    let lines: Vec<&str> = env.lines().collect();
    assert!(lines.contains(&"API_KEY=abc"));
    assert!(lines.contains(&r#"NESTED={"a": 1}"#));
}

#[test]
fn test_google_drive_credentials_line() {
    let root = fixture_root();
    let out = tempdir().unwrap();
    let credentials = json!({"token": "ya29", "refresh_token": "1//0g", "scopes": ["drive.readonly"]});
    let cfg = config(json!({"type": "google_drive_v1", "credentials": credentials}));

    generator(root.path())
        .generate("no_schema", &cfg, Some(out.path()))
        .unwrap();

    let env = fs::read_to_string(out.path().join(ENV_FILE)).unwrap();
    let line = env
        .lines()
        .find(|l| l.starts_with("GOOGLE_CREDENTIALS="))
        .expect("GOOGLE_CREDENTIALS line");
    let payload = line
        .trim_start_matches("GOOGLE_CREDENTIALS=")
        .strip_prefix('\'')
        .and_then(|p| p.strip_suffix('\''))
        .unwrap();
    let decoded: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(decoded, credentials);
}

#[test]
fn test_nonexistent_template_creates_nothing() {
    let root = fixture_root();
    let scratch = tempdir().unwrap();
    let generator = Generator::new(EngineConfig::new(root.path()).temp_root(scratch.path())).unwrap();

    let err = generator
        .generate("nonexistent-template", &Configuration::new(), None)
        .unwrap_err();
    assert!(matches!(err, SmithError::TemplateNotFound(_)));
    assert!(err.is_pre_mutation());
    assert_eq!(count_entries(scratch.path()), 0);

    let target = scratch.path().join("out");
    let err = generator
        .generate("nonexistent-template", &Configuration::new(), Some(&target))
        .unwrap_err();
    assert!(matches!(err, SmithError::TemplateNotFound(_)));
    assert!(!target.exists());
}

#[test]
fn test_missing_required_field_creates_nothing() {
    let root = fixture_root();
    let scratch = tempdir().unwrap();
    let generator = Generator::new(EngineConfig::new(root.path()).temp_root(scratch.path())).unwrap();

    let err = generator
        .generate("with_required", &Configuration::new(), None)
        .unwrap_err();
    match &err {
        SmithError::InvalidConfiguration { template, reasons } => {
            assert_eq!(template, "with_required");
            assert!(reasons.iter().any(|r| r.contains("doc_url")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_entries(scratch.path()), 0);

    let target = scratch.path().join("out");
    assert!(generator
        .generate("with_required", &Configuration::new(), Some(&target))
        .is_err());
    assert!(!target.exists());
}

#[test]
fn test_strict_schema_rejects_schemaless_template() {
    let root = fixture_root();
    let out = tempdir().unwrap();
    let generator = Generator::new(EngineConfig::new(root.path()).strict_schema(true)).unwrap();

    let err = generator
        .generate("no_schema", &Configuration::new(), Some(&out.path().join("x")))
        .unwrap_err();
    assert!(matches!(err, SmithError::InvalidConfiguration { .. }));
    assert!(!out.path().join("x").exists());
}

#[test]
fn test_caller_directory_created_with_parents() {
    let root = fixture_root();
    let out = tempdir().unwrap();
    let target = out.path().join("a/b/c");

    let output = generator(root.path())
        .generate("no_schema", &config(json!({"name": "jina"})), Some(&target))
        .unwrap();

    assert_eq!(output.path, fs::canonicalize(&target).unwrap());
    assert_eq!(
        fs::read_to_string(target.join("main.py")).unwrap().trim_end(),
        "NAME = \"jina\""
    );
    assert_eq!(output.env_file, output.path.join(ENV_FILE));
}

#[test]
fn test_render_failure_reports_partial_output() {
    let root = fixture_root();
    write(&root.path().join("broken/a_asset.txt"), "asset");
    write(&root.path().join("broken/b_main.py"), "{% if %}");
    let out = tempdir().unwrap();
    let target = out.path().join("gen");

    let err = generator(root.path())
        .generate("broken", &Configuration::new(), Some(&target))
        .unwrap_err();

    assert!(matches!(err, SmithError::Render { .. }));
    assert_eq!(err.partial_output(), Some(fs::canonicalize(&target).unwrap().as_path()));
    assert!(target.join("a_asset.txt").exists());
    assert!(!target.join(ENV_FILE).exists());
}

#[test]
fn test_cleanup_on_failure_only_removes_created_dirs() {
    let root = fixture_root();
    write(&root.path().join("broken/main.py"), "{% for %}");
    let out = tempdir().unwrap();
    let generator = Generator::new(EngineConfig::new(root.path()).cleanup_on_failure(true)).unwrap();

    let fresh = out.path().join("fresh");
    assert!(generator
        .generate("broken", &Configuration::new(), Some(&fresh))
        .is_err());
    assert!(!fresh.exists());

    let existing = out.path().join("existing");
    write(&existing.join("mine.txt"), "keep");
    assert!(generator
        .generate("broken", &Configuration::new(), Some(&existing))
        .is_err());
    assert!(existing.join("mine.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_unwritable_output_is_generation_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let root = fixture_root();
    let out = tempdir().unwrap();
    let locked = out.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores permission bits.
    if fs::write(locked.join("probe"), "x").is_ok() {
        return;
    }

    let err = generator(root.path())
        .generate("assets_only", &Configuration::new(), Some(&locked))
        .unwrap_err();
    assert!(matches!(
        err,
        SmithError::GenerationIo { step: GenerationStep::Copy, .. }
    ));
    assert!(err.partial_output().is_some());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_sample_fastmcp_base_generation() {
    let templates_path = get_templates_path();
    let out = tempdir().unwrap();
    let generator = Generator::new(EngineConfig::new(&templates_path).type_check(true)).unwrap();
    let cfg = config(json!({
        "service_name": "Deepsearch",
        "credentials": {"api_key": "jina_test"},
        "settings": {"base_url": "https://deepsearch.jina.ai"}
    }));

    let output = generator.generate("fastmcp_base", &cfg, Some(out.path())).unwrap();

    let server = fs::read_to_string(out.path().join("server.py")).unwrap();
    assert!(server.contains("mcp = FastMCP(\"Deepsearch\")"));
    assert!(server.contains("os.getenv(\"BASE_URL\", \"https://deepsearch.jina.ai\")"));
    assert!(server.contains("f\"Bearer {API_KEY}\""));
    assert!(out.path().join("tools/__init__.py").exists());
    assert!(!out.path().join("template.yaml").exists());
    assert!(!out.path().join(SCHEMA_FILE).exists());
    assert!(output.rendered.contains(&PathBuf::from("server.py")));

    let env = fs::read_to_string(out.path().join(ENV_FILE)).unwrap();
    assert_eq!(env, "API_KEY=jina_test\nBASE_URL=https://deepsearch.jina.ai\n");

    let bad = config(json!({"service_name": 42, "credentials": {"api_key": "k"}}));
    assert!(matches!(
        generator.generate("fastmcp_base", &bad, Some(&out.path().join("bad"))),
        Err(SmithError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_sample_google_drive_generation() {
    let templates_path = get_templates_path();
    let out = tempdir().unwrap();
    let cfg = config(json!({
        "type": "google_drive",
        "credentials": {
            "token": "ya29",
            "refresh_token": "1//0g",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "secret"
        },
        "settings": {"page_size": 25}
    }));

    generator(&templates_path)
        .generate("google_drive", &cfg, Some(out.path()))
        .unwrap();

    let server = fs::read_to_string(out.path().join("server.py")).unwrap();
    assert!(server.contains("mcp = FastMCP(\"Google Drive\")"));
    assert!(server.contains("max_results: int = 25"));

    let env = fs::read_to_string(out.path().join(ENV_FILE)).unwrap();
    let keys: Vec<&str> = env.lines().map(|l| l.split('=').next().unwrap()).collect();
    assert_eq!(
        keys,
        vec!["TOKEN", "REFRESH_TOKEN", "CLIENT_ID", "CLIENT_SECRET", "GOOGLE_CREDENTIALS", "PAGE_SIZE"]
    );
}
