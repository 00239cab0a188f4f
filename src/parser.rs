//! Parse a message document into an attribute tree using PEST.

use crate::tree::Node;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct DocumentParser;

/// Parse a document source into its root node.
pub fn parse(source: &str) -> Result<Node, String> {
    let pairs = DocumentParser::parse(Rule::document, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let document = pairs.into_iter().next().ok_or("Empty parse")?;
    let node = document
        .into_inner()
        .find(|p| p.as_rule() == Rule::node)
        .ok_or("Document without a root node")?;
    build_node(node)
}

fn build_node(pair: pest::iterators::Pair<Rule>) -> Result<Node, String> {
    let mut node: Option<Node> = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => {
                node = Some(Node::new(inner.as_str()));
            }
            Rule::attribute => {
                let mut it = inner.into_inner();
                let name = it.next().ok_or("attribute: missing name")?.as_str();
                let value_pair = it.next().ok_or("attribute: missing value")?;
                let raw = value_pair
                    .into_inner()
                    .next()
                    .map(|p| p.as_str())
                    .unwrap_or("");
                let value = unescape(raw)?;
                node = Some(node.ok_or("attribute before node name")?.attr(name, value));
            }
            Rule::block => {
                let mut n = node.ok_or("block before node name")?;
                for child in inner.into_inner() {
                    if child.as_rule() == Rule::node {
                        n.children.push(build_node(child)?);
                    }
                }
                node = Some(n);
            }
            _ => {}
        }
    }
    node.ok_or_else(|| "node without a name".to_string())
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            other => return Err(format!("invalid escape: \\{:?}", other)),
        }
    }
    Ok(out)
}
