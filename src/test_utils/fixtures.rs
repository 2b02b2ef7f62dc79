use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Manifest that passes every rule.
pub const MANIFEST: &str = r"owner: acme
name: summarizer
scm: https://github.com/acme/summarizer
license:
  name: MIT
  url: https://opensource.org/licenses/MIT
visibility: public
labels: [nlp, text]
authors:
  - jane.doe@example.com
image: registry.example.com/skill-runtime-python-3.9:1.0.0
properties:
  - name: LANGUAGE
    desc: input language
    default: en
contract: [summarize]
composable: true
network_access: false
resources:
  cpu:
    min: 100
  memory:
    min: 128
permissions: [read]
handler:
  file: handler
  function: evaluate
";

/// Contract with a single string field in each direction.
pub const CONTRACT: &str = r"namespaces:
  incoming:
    fields:
      - { name: data, type: string }
  outgoing:
    fields:
      - { name: text, type: string }
";

/// Shell handler: `evaluate` answers with a fixed text plus a field the
/// contract drops; lifecycle hooks append their name to `$LIFECYCLE_LOG`.
pub const HANDLER_SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  evaluate)
    cat > /dev/null
    printf '{"text":"some test output","language":"%s"}\n' "$LANGUAGE"
    ;;
  on_started|on_stopped)
    cat > /dev/null
    if [ -n "$LIFECYCLE_LOG" ]; then echo "$1" >> "$LIFECYCLE_LOG"; fi
    ;;
  *)
    exit 127
    ;;
esac
"#;

/// A skill checkout in a temp dir:
///
/// ```text
/// skill.yml
/// src/handler.sh
/// tests/contract/contract.dbs
/// tests/unit/            <- test_dir(), where the default paths resolve
/// ```
pub struct SkillProjectFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl SkillProjectFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        println!("[FIXTURE] Created skill project: {}", root.display());

        let fixture = Self { temp_dir, root };
        fixture.write_manifest(MANIFEST);
        fixture.write_contract(CONTRACT);
        fixture.write_handler("handler.sh", HANDLER_SCRIPT);
        std::fs::create_dir_all(fixture.test_dir()).expect("Failed to create test dir");
        fixture
    }

    /// Create a file below the project root.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {} ({} bytes)",
            full_path.display(),
            content.len()
        );
        full_path
    }

    pub fn write_manifest(&self, content: &str) -> PathBuf {
        self.create_file("skill.yml", content)
    }

    pub fn write_contract(&self, content: &str) -> PathBuf {
        self.create_file("tests/contract/contract.dbs", content)
    }

    /// Write a handler file under `src/` and mark it executable.
    pub fn write_handler(&self, name: &str, script: &str) -> PathBuf {
        let path = self.create_file(&format!("src/{name}"), script);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("Failed to mark handler executable");
        }
        path
    }

    /// Current manifest text.
    pub fn manifest(&self) -> String {
        std::fs::read_to_string(self.manifest_path()).expect("Failed to read manifest")
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("skill.yml")
    }

    pub fn contract_path(&self) -> PathBuf {
        self.root.join("tests/contract/contract.dbs")
    }

    pub fn handler_root(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Directory from which `../../skill.yml` and `../contract/contract.dbs` resolve.
    pub fn test_dir(&self) -> PathBuf {
        self.root.join("tests/unit")
    }
}

impl Default for SkillProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
