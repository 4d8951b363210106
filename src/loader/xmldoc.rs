//! Documentation-comment file parser.
//!
//! Reads the standard XML doc format: `/doc/assembly/name` declares the
//! assembly the file documents (the reconciliation key), and each
//! `/doc/members/member` carries tag-based prose keyed by a signature-derived
//! identifier. Inline markup (`<see cref="…"/>`, `<paramref name="…"/>`) is
//! flattened into the surrounding text.

use crate::model::{DocBlock, InheritDoc, ParamDoc};
use anyhow::{anyhow, bail, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed documentation-comment file.
#[derive(Debug, Clone)]
pub struct DocFile {
    /// Assembly name declared inside the file, trimmed.
    pub assembly_name: String,
    pub path: PathBuf,
    members: HashMap<String, DocBlock>,
}

impl DocFile {
    pub fn load(path: &Path) -> Result<DocFile> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        DocFile::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<DocFile> {
        let mut parser = DocParser::default();
        parser.run(content)?;

        let assembly_name = match parser.assembly_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => bail!("not valid xml documentation (missing /doc/assembly/name)"),
        };
        Ok(DocFile {
            assembly_name,
            path: path.to_path_buf(),
            members: parser.members,
        })
    }

    /// Doc block for a member identifier, if the file documents it.
    pub fn member(&self, id: &str) -> Option<&DocBlock> {
        self.members.get(id)
    }
}

/// Tag currently accumulating text.
#[derive(Debug, Clone, PartialEq)]
enum DocTag {
    Summary,
    Remarks,
    Example,
    Value,
    Returns,
    Obsolete,
    Param(String),
}

#[derive(Default)]
struct DocParser {
    assembly_name: Option<String>,
    members: HashMap<String, DocBlock>,

    /// Open element names, document root downward.
    stack: Vec<String>,
    member_id: Option<String>,
    block: DocBlock,
    tag: Option<DocTag>,
    /// Stack depth at which the active tag opened.
    tag_depth: usize,
    buf: String,
}

impl DocParser {
    fn run(&mut self, content: &str) -> Result<()> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Err(e) => bail!("xml error at byte {}: {e}", reader.buffer_position()),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => self.on_start(&e)?,
                Ok(Event::Empty(e)) => {
                    // Self-closing element: open + close in one step.
                    self.on_start(&e)?;
                    self.on_end();
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| anyhow!("bad text: {e}"))?;
                    self.on_text(&text);
                }
                Ok(Event::End(_)) => self.on_end(),
                Ok(_) => {}
            }
        }
        Ok(())
    }

    fn on_start(&mut self, e: &BytesStart) -> Result<()> {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

        if self.tag.is_some() {
            // Inline markup inside prose: flatten the reference target.
            if let Some(target) = attr(e, "cref")?.or(attr(e, "name")?) {
                if !self.buf.is_empty() && !self.buf.ends_with(' ') {
                    self.buf.push(' ');
                }
                self.buf.push_str(&target);
            }
        } else if self.member_id.is_some() {
            match name.as_str() {
                "summary" => self.open_tag(DocTag::Summary),
                "remarks" => self.open_tag(DocTag::Remarks),
                "example" => self.open_tag(DocTag::Example),
                "value" => self.open_tag(DocTag::Value),
                "returns" => self.open_tag(DocTag::Returns),
                "obsolete" => self.open_tag(DocTag::Obsolete),
                "param" => {
                    let pname = attr(e, "name")?.unwrap_or_default();
                    self.open_tag(DocTag::Param(pname));
                }
                "inheritdoc" => {
                    self.block.inherit = Some(match attr(e, "cref")? {
                        Some(cref) => InheritDoc::From(cref),
                        None => InheritDoc::Auto,
                    });
                }
                // Unknown member tags are ignored.
                _ => {}
            }
        } else if name == "member" && self.stack.last().map(String::as_str) == Some("members") {
            self.member_id = attr(e, "name")?;
            self.block = DocBlock::default();
        }

        self.stack.push(name);
        Ok(())
    }

    fn on_text(&mut self, text: &str) {
        if self.tag.is_some() {
            if !self.buf.is_empty() {
                self.buf.push(' ');
            }
            self.buf.push_str(text);
        } else if self.path_is(&["doc", "assembly", "name"]) {
            self.assembly_name = Some(text.to_string());
        }
    }

    fn on_end(&mut self) {
        let closed = self.stack.pop();

        if self.tag.is_some() && self.stack.len() == self.tag_depth {
            let text = normalize(&self.buf);
            match self.tag.take().unwrap() {
                DocTag::Summary => self.block.summary = text,
                DocTag::Remarks => self.block.remarks = text,
                DocTag::Example => self.block.example = text,
                DocTag::Value => self.block.value = text,
                DocTag::Returns => self.block.returns = text,
                DocTag::Obsolete => self.block.obsolete = text,
                DocTag::Param(name) => {
                    if let (false, Some(text)) = (name.is_empty(), text) {
                        self.block.params.push(ParamDoc { name, text });
                    }
                }
            }
            self.buf.clear();
            return;
        }

        if closed.as_deref() == Some("member") && self.member_id.is_some() {
            let id = self.member_id.take().unwrap();
            let block = std::mem::take(&mut self.block);
            // First declaration wins for duplicate member entries.
            self.members.entry(id).or_insert(block);
        }
    }

    fn open_tag(&mut self, tag: DocTag) {
        self.tag = Some(tag);
        self.tag_depth = self.stack.len();
        self.buf.clear();
    }

    fn path_is(&self, expected: &[&str]) -> bool {
        self.stack.len() == expected.len()
            && self.stack.iter().zip(expected).all(|(a, b)| a == b)
    }
}

/// Read one attribute value by name.
fn attr(e: &BytesStart, name: &str) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(|e| anyhow!("bad attribute: {e}"))?;
        if a.key.as_ref() == name.as_bytes() {
            let value = a
                .unescape_value()
                .map_err(|e| anyhow!("bad attribute value: {e}"))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Collapse runs of whitespace left by XML indentation; None when empty.
fn normalize(raw: &str) -> Option<String> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<doc>
  <assembly><name> Acme.Core </name></assembly>
  <members>
    <member name="T:Acme.Text.StringHelper">
      <summary>
        Helpers for
        string handling.
      </summary>
      <remarks>See also <see cref="T:Acme.Base.Helper"/>.</remarks>
    </member>
    <member name="M:Acme.Text.StringHelper.Trim(System.String)">
      <summary>Trims <paramref name="value"/>.</summary>
      <param name="value">The string to trim.</param>
      <returns>The trimmed string.</returns>
    </member>
    <member name="P:Acme.Text.StringHelper.Length">
      <inheritdoc/>
      <value>Number of characters.</value>
    </member>
    <member name="M:Acme.Text.StringHelper.Copy">
      <inheritdoc cref="M:Acme.Base.Helper.Copy"/>
    </member>
  </members>
</doc>
"#;

    fn parse(content: &str) -> DocFile {
        DocFile::parse(content, Path::new("test.xml")).unwrap()
    }

    #[test]
    fn assembly_name_is_trimmed() {
        assert_eq!(parse(SAMPLE).assembly_name, "Acme.Core");
    }

    #[test]
    fn summary_whitespace_collapsed() {
        let doc = parse(SAMPLE);
        let block = doc.member("T:Acme.Text.StringHelper").unwrap();
        assert_eq!(
            block.summary.as_deref(),
            Some("Helpers for string handling.")
        );
    }

    #[test]
    fn inline_markup_flattened() {
        let doc = parse(SAMPLE);
        let block = doc.member("T:Acme.Text.StringHelper").unwrap();
        assert_eq!(
            block.remarks.as_deref(),
            Some("See also T:Acme.Base.Helper .")
        );
        let trim = doc
            .member("M:Acme.Text.StringHelper.Trim(System.String)")
            .unwrap();
        assert_eq!(trim.summary.as_deref(), Some("Trims value ."));
    }

    #[test]
    fn params_and_returns_captured() {
        let doc = parse(SAMPLE);
        let block = doc
            .member("M:Acme.Text.StringHelper.Trim(System.String)")
            .unwrap();
        assert_eq!(block.param("value"), Some("The string to trim."));
        assert_eq!(block.returns.as_deref(), Some("The trimmed string."));
    }

    #[test]
    fn inheritdoc_modes() {
        let doc = parse(SAMPLE);
        assert_eq!(
            doc.member("P:Acme.Text.StringHelper.Length").unwrap().inherit,
            Some(InheritDoc::Auto)
        );
        assert_eq!(
            doc.member("M:Acme.Text.StringHelper.Copy").unwrap().inherit,
            Some(InheritDoc::From("M:Acme.Base.Helper.Copy".to_string()))
        );
    }

    #[test]
    fn missing_assembly_name_rejected() {
        let err = DocFile::parse("<doc><members/></doc>", Path::new("bad.xml")).unwrap_err();
        assert!(err.to_string().contains("not valid xml documentation"));
    }

    #[test]
    fn unknown_member_lookup_is_none() {
        assert!(parse(SAMPLE).member("T:Nope").is_none());
    }
}
