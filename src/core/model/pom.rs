//! Reading `pom.xml` files.
//!
//! Only the subset of the POM that workspace discovery needs is read:
//! coordinates, parent reference, modules, properties, build directories,
//! resources, dependencies and profiles. Everything else is ignored.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::coordinate::DEFAULT_TYPE;
use crate::core::errors::{Result, WorkspaceError};
use crate::core::model::profile::{Activation, FileActivation, Profile, PropertyActivation};
use crate::core::model::{BuildSettings, Dependency, ParentRef, Resource};

/// Everything one descriptor declares, as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDocument {
    pub path: PathBuf,
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub modules: Vec<String>,
    pub properties: IndexMap<String, String>,
    pub build: BuildSettings,
    pub dependencies: Vec<Dependency>,
    pub profiles: Vec<Profile>,
}

impl PomDocument {
    /// Read and parse the descriptor at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| WorkspaceError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Parse descriptor text. `path` is recorded and used in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let root = parse_tree(content, path)?;
        if root.name != "project" {
            return Err(WorkspaceError::parse(
                path,
                format!("expected <project> root element, found <{}>", root.name),
            ));
        }

        let artifact_id = root
            .text_of("artifactId")
            .filter(|a| !a.is_empty())
            .ok_or_else(|| WorkspaceError::parse(path, "missing <artifactId>"))?;

        let parent = match root.child("parent") {
            Some(el) => Some(read_parent(el, path)?),
            None => None,
        };

        Ok(PomDocument {
            path: path.to_path_buf(),
            group_id: root.text_of("groupId"),
            artifact_id,
            version: root.text_of("version"),
            packaging: root.text_of("packaging"),
            parent,
            modules: read_modules(&root),
            properties: read_properties(&root),
            build: root.child("build").map(read_build).unwrap_or_default(),
            dependencies: read_dependencies(&root),
            profiles: root
                .child("profiles")
                .map(|el| el.children_named("profile").map(read_profile).collect())
                .unwrap_or_default(),
        })
    }
}

/// Minimal element tree; attributes are not needed.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(start: &BytesStart<'_>) -> Self {
        Element {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of a child element; `Some("")` for an empty element.
    fn text_of(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.trim().to_string())
    }
}

fn parse_tree(content: &str, path: &Path) -> Result<Element> {
    let mut reader = Reader::from_reader(content.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(Element::new(e)),
            Ok(Event::Empty(ref e)) => attach(&mut stack, &mut root, Element::new(e)),
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().map_err(|e| {
                    WorkspaceError::parse(
                        path,
                        format!("invalid text at position {}: {e}", reader.buffer_position()),
                    )
                })?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| WorkspaceError::parse(path, "unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(WorkspaceError::parse(
                    path,
                    format!("XML parse error at position {}: {e}", reader.error_position()),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(WorkspaceError::parse(
            path,
            format!("unexpected end of document inside <{}>", open.name),
        ));
    }

    root.ok_or_else(|| WorkspaceError::parse(path, "document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {}
    }
}

fn read_parent(el: &Element, path: &Path) -> Result<ParentRef> {
    let group_id = el
        .text_of("groupId")
        .filter(|g| !g.is_empty())
        .ok_or_else(|| WorkspaceError::parse(path, "missing <parent><groupId>"))?;
    let artifact_id = el
        .text_of("artifactId")
        .filter(|a| !a.is_empty())
        .ok_or_else(|| WorkspaceError::parse(path, "missing <parent><artifactId>"))?;

    Ok(ParentRef {
        group_id,
        artifact_id,
        version: el.text_of("version").filter(|v| !v.is_empty()),
        relative_path: el.text_of("relativePath"),
    })
}

/// `<modules><module>` plus the newer `<subprojects><subproject>` spelling.
fn read_modules(el: &Element) -> Vec<String> {
    let mut modules = Vec::new();
    for (list, item) in [("modules", "module"), ("subprojects", "subproject")] {
        if let Some(list) = el.child(list) {
            modules.extend(
                list.children_named(item)
                    .map(|m| m.text.trim().to_string())
                    .filter(|m| !m.is_empty()),
            );
        }
    }
    modules
}

fn read_properties(el: &Element) -> IndexMap<String, String> {
    el.child("properties")
        .map(|props| {
            props
                .children
                .iter()
                .map(|p| (p.name.clone(), p.text.trim().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn read_build(el: &Element) -> BuildSettings {
    BuildSettings {
        directory: el.text_of("directory"),
        output_directory: el.text_of("outputDirectory"),
        test_output_directory: el.text_of("testOutputDirectory"),
        source_directory: el.text_of("sourceDirectory"),
        test_source_directory: el.text_of("testSourceDirectory"),
        final_name: el.text_of("finalName"),
        resources: el
            .child("resources")
            .map(|r| read_resources(r, "resource")),
        test_resources: el
            .child("testResources")
            .map(|r| read_resources(r, "testResource")),
    }
}

fn read_resources(list: &Element, item: &str) -> Vec<Resource> {
    list.children_named(item)
        .filter_map(|r| {
            let directory = r.text_of("directory").filter(|d| !d.is_empty())?;
            Some(Resource {
                directory,
                target_path: r.text_of("targetPath").filter(|t| !t.is_empty()),
            })
        })
        .collect()
}

fn read_dependencies(el: &Element) -> Vec<Dependency> {
    let Some(list) = el.child("dependencies") else {
        return Vec::new();
    };

    list.children_named("dependency")
        .filter_map(|d| {
            Some(Dependency {
                group_id: d.text_of("groupId").filter(|g| !g.is_empty())?,
                artifact_id: d.text_of("artifactId").filter(|a| !a.is_empty())?,
                version: d.text_of("version").filter(|v| !v.is_empty()),
                kind: d
                    .text_of("type")
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| DEFAULT_TYPE.to_string()),
                classifier: d.text_of("classifier").filter(|c| !c.is_empty()),
                scope: d.text_of("scope").filter(|s| !s.is_empty()),
            })
        })
        .collect()
}

fn read_profile(el: &Element) -> Profile {
    let activation = el
        .child("activation")
        .map(|a| Activation {
            active_by_default: a.text_of("activeByDefault").as_deref() == Some("true"),
            property: a.child("property").and_then(|p| {
                let name = p.text_of("name").filter(|n| !n.is_empty())?;
                Some(PropertyActivation {
                    name,
                    value: p.text_of("value").filter(|v| !v.is_empty()),
                })
            }),
            file: a.child("file").map(|f| FileActivation {
                exists: f.text_of("exists").filter(|e| !e.is_empty()),
                missing: f.text_of("missing").filter(|m| !m.is_empty()),
            }),
            unsupported: a.child("jdk").is_some() || a.child("os").is_some(),
        })
        .unwrap_or_default();

    Profile {
        id: el
            .text_of("id")
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "default".to_string()),
        activation,
        modules: read_modules(el),
        properties: read_properties(el),
        dependencies: read_dependencies(el),
    }
}
