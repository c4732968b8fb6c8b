//! Flow definition fragments
//!
//! Renders script nodes, chains and the enclosing flow document. Values are
//! written as-is: attributes are not escaped and script bodies are wrapped in a
//! single CDATA section.

use tracing::warn;

use rulesync_common::Result;

use crate::node::NodeDescriptor;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render one `<node>` element for a descriptor and its script body.
///
/// The `language` attribute is emitted only when the descriptor carries a
/// non-blank language.
pub fn render_node(descriptor: &NodeDescriptor, content: &str) -> String {
    match descriptor.language() {
        Some(language) => format!(
            r#"<node id="{}" name="{}" type="{}" language="{}"><![CDATA[{}]]></node>"#,
            descriptor.node_id, descriptor.name, descriptor.node_type, language, content
        ),
        None => format!(
            r#"<node id="{}" name="{}" type="{}"><![CDATA[{}]]></node>"#,
            descriptor.node_id, descriptor.name, descriptor.node_type, content
        ),
    }
}

/// Parse `identifier` and render its `<node>` element.
///
/// Fails with `InvalidIdentifier` without rendering anything when the
/// identifier does not parse.
pub fn render_script_node(identifier: &str, content: &str) -> Result<String> {
    let descriptor = NodeDescriptor::try_parse(identifier)?;
    Ok(render_node(&descriptor, content))
}

pub fn render_chain(name: &str, el: &str) -> String {
    format!(r#"<chain name="{}">{}</chain>"#, name, el)
}

/// Wrap already rendered `<node>` elements in `<nodes>`
pub fn render_nodes<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let body: String = fragments.into_iter().map(|f| f.as_ref().to_string()).collect();
    format!("<nodes>{}</nodes>", body)
}

/// Assemble the full flow document from a rendered `<nodes>` block (may be
/// empty) and concatenated `<chain>` elements
pub fn render_flow(nodes: &str, chains: &str) -> String {
    format!("{}<flow>{}{}</flow>", XML_HEADER, nodes, chains)
}

/// Collects script and chain entries read from the store and renders them as
/// one flow document
#[derive(Debug, Clone, Default)]
pub struct FlowDocument {
    scripts: Vec<(String, String)>,
    chains: Vec<(String, String)>,
}

impl FlowDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script entry keyed by its compact identifier
    pub fn add_script(&mut self, identifier: impl Into<String>, script: impl Into<String>) -> &mut Self {
        self.scripts.push((identifier.into(), script.into()));
        self
    }

    pub fn add_chain(&mut self, name: impl Into<String>, el: impl Into<String>) -> &mut Self {
        self.chains.push((name.into(), el.into()));
        self
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Render the document.
    ///
    /// Script entries whose identifier does not parse are skipped with a
    /// warning. The `<nodes>` block is left out when no script entry was added.
    pub fn render(&self) -> String {
        let nodes = if self.scripts.is_empty() {
            String::new()
        } else {
            let fragments = self
                .scripts
                .iter()
                .filter_map(|(identifier, script)| match NodeDescriptor::parse(identifier) {
                    Some(descriptor) => Some(render_node(&descriptor, script)),
                    None => {
                        warn!(identifier = %identifier, "Skipping script entry with malformed identifier");
                        None
                    }
                });
            render_nodes(fragments)
        };

        let chains: String = self
            .chains
            .iter()
            .map(|(name, el)| render_chain(name, el))
            .collect();

        render_flow(&nodes, &chains)
    }
}
