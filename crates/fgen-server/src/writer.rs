//! Generated declaration file and its marker comment in `server.xml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use fgen_reconcile::{DeclarationError, DeclarationWriter, FeatureSet};

use crate::xml_text::{read_xml, write_xml};

pub const OVERRIDES_DIR: &str = "configDropins/overrides";
pub const GENERATED_FEATURES_FILE: &str = "liberty-plugin-added-features.xml";
pub const HEADER: &str = "# Generated by liberty-maven-plugin";
pub const FEATURES_FILE_MESSAGE: &str = "The Liberty Maven Plugin has generated Liberty features necessary for your application in configDropins/overrides/liberty-plugin-added-features.xml";

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full text of the generated declaration. Features are emitted in set order.
pub fn render_declaration(features: &FeatureSet) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    xml.push_str("<server>\n");
    xml.push_str(&format!("    <!--{HEADER}-->\n"));
    xml.push_str("    <featureManager>\n");
    for f in features {
        xml.push_str(&format!("        <feature>{}</feature>\n", escape_xml(f)));
    }
    xml.push_str("    </featureManager>\n");
    xml.push_str("</server>\n");
    xml
}

/// End of the opening tag named `tag`, if present and not self-closing.
fn open_tag_end(xml: &str, tag: &str) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut from = 0;
    while let Some(rel) = xml[from..].find(&needle) {
        let start = from + rel;
        let after = start + needle.len();
        let next = xml[after..].chars().next()?;
        if next == '>' || next.is_whitespace() || next == '/' {
            let close = after + xml[after..].find('>')?;
            if xml[..close].ends_with('/') {
                return None;
            }
            return Some(close + 1);
        }
        from = after;
    }
    None
}

/// `xml` with the marker comment added, or `None` when nothing changes.
pub fn insert_marker(xml: &str) -> Option<String> {
    if xml.contains(FEATURES_FILE_MESSAGE) {
        return None;
    }
    let (at, indent) = match open_tag_end(xml, "featureManager") {
        Some(at) => (at, "        "),
        None => (open_tag_end(xml, "server")?, "    "),
    };
    let mut out = String::with_capacity(xml.len() + FEATURES_FILE_MESSAGE.len() + 16);
    out.push_str(&xml[..at]);
    out.push('\n');
    out.push_str(indent);
    out.push_str(&format!("<!-- {FEATURES_FILE_MESSAGE} -->"));
    out.push_str(&xml[at..]);
    Some(out)
}

/// `xml` with every marker comment removed, or `None` when there is none.
pub fn remove_marker(xml: &str) -> Option<String> {
    let mut out = xml.to_string();
    let mut changed = false;
    while let Some(idx) = out.find(FEATURES_FILE_MESSAGE) {
        let (Some(open), Some(close_rel)) = (out[..idx].rfind("<!--"), out[idx..].find("-->"))
        else {
            break;
        };
        let mut start = open;
        let end = idx + close_rel + 3;
        // Take the now-blank line with it.
        while start > 0 && matches!(out.as_bytes()[start - 1], b' ' | b'\t') {
            start -= 1;
        }
        if start > 0 && out.as_bytes()[start - 1] == b'\n' {
            start -= 1;
            if start > 0 && out.as_bytes()[start - 1] == b'\r' {
                start -= 1;
            }
        }
        out.replace_range(start..end, "");
        changed = true;
    }
    changed.then_some(out)
}

fn failed(path: &Path, action: &'static str) -> impl FnOnce(io::Error) -> DeclarationError {
    let path = path.to_path_buf();
    move |cause| DeclarationError {
        path,
        action,
        cause,
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), DeclarationError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(failed(parent, "create directory"))?;
    }
    fs::write(path, contents).map_err(failed(path, "write"))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[derive(Debug, Default)]
struct Retracted {
    contents: Option<Vec<u8>>,
    marker_removed: bool,
}

/// Writes the generated file into the source configuration directory, copies
/// it into the server directory, and marks `server.xml`.
#[derive(Debug)]
pub struct DropinWriter {
    config_dir: PathBuf,
    server_dir: PathBuf,
    server_xml: PathBuf,
    retracted: Option<Retracted>,
}

impl DropinWriter {
    pub fn new(
        config_dir: impl Into<PathBuf>,
        server_dir: impl Into<PathBuf>,
        server_xml: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            server_dir: server_dir.into(),
            server_xml: server_xml.into(),
            retracted: None,
        }
    }

    pub fn source_file(&self) -> PathBuf {
        self.config_dir.join(OVERRIDES_DIR).join(GENERATED_FEATURES_FILE)
    }

    pub fn server_file(&self) -> PathBuf {
        self.server_dir.join(OVERRIDES_DIR).join(GENERATED_FEATURES_FILE)
    }

    /// Rewrite `server.xml` through `edit`. Missing file is a no-op.
    fn edit_server_xml(
        &self,
        edit: impl FnOnce(&str) -> Option<String>,
    ) -> Result<bool, DeclarationError> {
        if !self.server_xml.is_file() {
            return Ok(false);
        }
        let doc = read_xml(&self.server_xml).map_err(failed(&self.server_xml, "read"))?;
        match edit(&doc.text) {
            Some(updated) => {
                write_xml(&self.server_xml, &doc.with_text(updated))
                    .map_err(failed(&self.server_xml, "update"))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn rollback(&self, created: &[PathBuf]) {
        for path in created.iter().rev() {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "could not remove partially written file");
                }
            }
        }
        if let Err(e) = self.edit_server_xml(remove_marker) {
            warn!(error = %e, "could not remove generated features marker");
        }
    }

    fn write_all(
        &self,
        features: &FeatureSet,
        created: &mut Vec<PathBuf>,
    ) -> Result<PathBuf, DeclarationError> {
        let xml = render_declaration(features);
        let src = self.source_file();
        write_file(&src, xml.as_bytes())?;
        created.push(src.clone());

        if !same_dir(&self.config_dir, &self.server_dir) {
            let target = self.server_file();
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(failed(parent, "create directory"))?;
            }
            fs::copy(&src, &target).map_err(failed(&target, "copy"))?;
            created.push(target);
        }

        self.edit_server_xml(insert_marker)?;
        Ok(src)
    }
}

impl DeclarationWriter for DropinWriter {
    fn retract_previous(&mut self) -> Result<(), DeclarationError> {
        let target = self.server_file();
        let mut retracted = Retracted::default();
        if target.is_file() {
            retracted.contents = Some(fs::read(&target).map_err(failed(&target, "read"))?);
            fs::remove_file(&target).map_err(failed(&target, "remove"))?;
            debug!(path = %target.display(), "removed previously generated features file");
        }
        match self.edit_server_xml(remove_marker) {
            Ok(removed) => {
                retracted.marker_removed = removed;
                self.retracted = Some(retracted);
                Ok(())
            }
            Err(e) => {
                // A failed retract leaves the previous declaration in place.
                if let Some(contents) = &retracted.contents {
                    if let Err(restore) = write_file(&target, contents) {
                        warn!(path = %target.display(), error = %restore, "could not put back generated features file");
                    }
                }
                Err(e)
            }
        }
    }

    fn restore_previous(&mut self) -> Result<(), DeclarationError> {
        let Some(retracted) = self.retracted.take() else {
            return Ok(());
        };
        if let Some(contents) = &retracted.contents {
            write_file(&self.server_file(), contents)?;
        }
        if retracted.marker_removed {
            self.edit_server_xml(insert_marker)?;
        }
        Ok(())
    }

    fn write_declaration(&mut self, features: &FeatureSet) -> Result<PathBuf, DeclarationError> {
        let mut created = Vec::new();
        match self.write_all(features, &mut created) {
            Ok(path) => {
                self.retracted = None;
                info!(path = %path.display(), count = features.len(), "generated features written");
                Ok(path)
            }
            Err(e) => {
                self.rollback(&created);
                Err(e)
            }
        }
    }
}
