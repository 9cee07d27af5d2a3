//! Shared fixtures: descriptor builders and sample workspace trees.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use berth::{GlobalContext, WorkspaceConfig};

pub const GROUP: &str = "org.acme";

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Context rooted at `cwd` with default configuration.
pub fn ctx(cwd: &Path) -> GlobalContext {
    ctx_with(cwd, WorkspaceConfig::default())
}

pub fn ctx_with(cwd: &Path, config: WorkspaceConfig) -> GlobalContext {
    init_tracing();
    GlobalContext::with_config(cwd.to_path_buf(), config)
}

pub fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap()
}

/// Builder for small `pom.xml` files.
#[derive(Debug, Clone)]
pub struct Pom {
    group: Option<String>,
    artifact: String,
    version: Option<String>,
    packaging: Option<String>,
    parent: Option<(String, String, String, Option<String>)>,
    modules: Vec<String>,
    properties: Vec<(String, String)>,
    build: Option<String>,
    extra: String,
}

impl Pom {
    /// `org.acme:<artifact>:1.0`.
    pub fn new(artifact: &str) -> Self {
        Pom {
            group: Some(GROUP.to_string()),
            artifact: artifact.to_string(),
            version: Some("1.0".to_string()),
            packaging: None,
            parent: None,
            modules: Vec::new(),
            properties: Vec::new(),
            build: None,
            extra: String::new(),
        }
    }

    /// An aggregator: packaging `pom`.
    pub fn aggregator(artifact: &str) -> Self {
        Self::new(artifact).packaging("pom")
    }

    /// A child inheriting group and version from `parent`.
    pub fn child_of(artifact: &str, parent: &str, version: &str) -> Self {
        Pom {
            group: None,
            version: None,
            ..Self::new(artifact)
        }
        .parent(parent, version, None)
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn packaging(mut self, packaging: &str) -> Self {
        self.packaging = Some(packaging.to_string());
        self
    }

    pub fn parent(mut self, artifact: &str, version: &str, relative_path: Option<&str>) -> Self {
        self.parent = Some((
            GROUP.to_string(),
            artifact.to_string(),
            version.to_string(),
            relative_path.map(str::to_string),
        ));
        self
    }

    pub fn module(mut self, module: &str) -> Self {
        self.modules.push(module.to_string());
        self
    }

    pub fn property(mut self, name: &str, value: &str) -> Self {
        self.properties.push((name.to_string(), value.to_string()));
        self
    }

    /// Raw XML placed inside `<build>`.
    pub fn build(mut self, xml: &str) -> Self {
        self.build = Some(xml.to_string());
        self
    }

    /// Raw XML appended inside `<project>`.
    pub fn extra(mut self, xml: &str) -> Self {
        self.extra.push_str(xml);
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  <modelVersion>4.0.0</modelVersion>\n",
        );
        if let Some((group, artifact, version, relative_path)) = &self.parent {
            xml.push_str("  <parent>\n");
            xml.push_str(&format!("    <groupId>{group}</groupId>\n"));
            xml.push_str(&format!("    <artifactId>{artifact}</artifactId>\n"));
            xml.push_str(&format!("    <version>{version}</version>\n"));
            if let Some(path) = relative_path {
                xml.push_str(&format!("    <relativePath>{path}</relativePath>\n"));
            }
            xml.push_str("  </parent>\n");
        }
        if let Some(group) = &self.group {
            xml.push_str(&format!("  <groupId>{group}</groupId>\n"));
        }
        xml.push_str(&format!("  <artifactId>{}</artifactId>\n", self.artifact));
        if let Some(version) = &self.version {
            xml.push_str(&format!("  <version>{version}</version>\n"));
        }
        if let Some(packaging) = &self.packaging {
            xml.push_str(&format!("  <packaging>{packaging}</packaging>\n"));
        }
        if !self.properties.is_empty() {
            xml.push_str("  <properties>\n");
            for (name, value) in &self.properties {
                xml.push_str(&format!("    <{name}>{value}</{name}>\n"));
            }
            xml.push_str("  </properties>\n");
        }
        if !self.modules.is_empty() {
            xml.push_str("  <modules>\n");
            for module in &self.modules {
                xml.push_str(&format!("    <module>{module}</module>\n"));
            }
            xml.push_str("  </modules>\n");
        }
        if let Some(build) = &self.build {
            xml.push_str(&format!("  <build>\n{build}\n  </build>\n"));
        }
        xml.push_str(&self.extra);
        xml.push_str("</project>\n");
        xml
    }

    /// Write `<dir>/pom.xml`, creating `dir`.
    pub fn write(&self, dir: &Path) -> PathBuf {
        self.write_as(dir, "pom.xml")
    }

    /// Write `<dir>/<file_name>`, creating `dir`.
    pub fn write_as(&self, dir: &Path, file_name: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(file_name);
        fs::write(&path, self.to_xml()).unwrap();
        path
    }
}

/// The sample workspace:
///
/// ```text
/// root/                      aggregator, modules 1-4
///   module1/                 standalone (no parent)
///   module2/                 parent root
///   other/module3/           parent root via ../../pom.xml
///   module4/                 parent root, empty relativePath
///   non-module-child/        parent root, not a module; aggregates another-child
///     another-child/
///   independent/             no parent, not a module
/// ```
///
/// Returns the root directory.
pub fn sample_workspace(base: &Path) -> PathBuf {
    let root = base.join("root");

    Pom::aggregator("acme-root")
        .module("module1")
        .module("module2")
        .module("other/module3")
        .module("module4")
        .write(&root);
    Pom::new("acme-module1").write(&root.join("module1"));
    Pom::child_of("acme-module2", "acme-root", "1.0").write(&root.join("module2"));
    Pom::child_of("acme-module3", "acme-root", "1.0")
        .parent("acme-root", "1.0", Some("../../pom.xml"))
        .write(&root.join("other/module3"));
    Pom::child_of("acme-module4", "acme-root", "1.0")
        .parent("acme-root", "1.0", Some(""))
        .write(&root.join("module4"));
    Pom::child_of("acme-non-module-child", "acme-root", "1.0")
        .packaging("pom")
        .module("another-child")
        .write(&root.join("non-module-child"));
    Pom::child_of("acme-another-child", "acme-non-module-child", "1.0")
        .write(&root.join("non-module-child/another-child"));
    Pom::new("acme-independent").write(&root.join("independent"));

    root
}

/// A CI-friendly workspace: every version is `${revision}${sha1}${changelist}`
/// and the root defines `revision=1`, `sha1=.2`, `changelist=.3`.
///
/// Returns the root directory.
pub fn ci_friendly_workspace(base: &Path) -> PathBuf {
    const VERSION: &str = "${revision}${sha1}${changelist}";
    let root = base.join("ci");

    Pom::aggregator("acme-ci-parent")
        .version(VERSION)
        .property("revision", "1")
        .property("sha1", ".2")
        .property("changelist", ".3")
        .module("module1")
        .module("module2")
        .write(&root);
    Pom::child_of("acme-ci-module1", "acme-ci-parent", VERSION)
        .build(
            "    <resources>\n      <resource><directory>build</directory><targetPath>META-INF/resources</targetPath></resource>\n    </resources>",
        )
        .write(&root.join("module1"));
    Pom::child_of("acme-ci-module2", "acme-ci-parent", VERSION).write(&root.join("module2"));

    root
}
