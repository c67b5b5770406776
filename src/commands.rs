//! The `hellas <alias> <verb>` command surface.
//!
//! `CommandTable` is built once from a catalog: every module gets `version`,
//! `dependencies`, and `features`; the aggregate root additionally gets
//! `rollcall`. Dispatch produces reply lines plus a JSON payload and an
//! outcome the binary maps onto its exit code. Unknown aliases and verbs are
//! usage errors; an uninstalled module is a normal `Failure` reply.

use crate::catalog::{CommandAlias, ModuleDescriptor, RegistryCatalog};
use crate::presence::{ModulePresenceOracle, ResourceLocator};
use crate::resolver::{ModuleMetadata, resolve};
use crate::rollcall::summarize;
use anyhow::{Result, bail};
use serde_json::{Value, json};

pub const DEFAULT_COMMAND_ROOT: &str = "hellas";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verb {
    Version,
    Dependencies,
    Features,
    Rollcall,
}

impl Verb {
    /// Verbs every module answers.
    pub const PER_MODULE: [Verb; 3] = [Verb::Version, Verb::Dependencies, Verb::Features];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Version => "version",
            Verb::Dependencies => "dependencies",
            Verb::Features => "features",
            Verb::Rollcall => "rollcall",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "version" => Some(Verb::Version),
            "dependencies" => Some(Verb::Dependencies),
            "features" => Some(Verb::Features),
            "rollcall" => Some(Verb::Rollcall),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Rendered answer to one command.
pub struct CommandReply {
    pub outcome: Outcome,
    pub lines: Vec<String>,
    pub payload: Value,
}

struct CommandNode<'c> {
    descriptor: &'c ModuleDescriptor,
    verbs: Vec<Verb>,
}

/// Static command table over a catalog.
pub struct CommandTable<'c> {
    root: String,
    catalog: &'c RegistryCatalog,
    nodes: Vec<CommandNode<'c>>,
}

impl<'c> CommandTable<'c> {
    pub fn build(catalog: &'c RegistryCatalog, root: &str) -> Self {
        let mut table = Self {
            root: root.to_string(),
            catalog,
            nodes: Vec::new(),
        };
        for descriptor in catalog.entries() {
            let node = table.find_or_create(descriptor);
            for verb in Verb::PER_MODULE {
                add_verb(node, verb);
            }
            if descriptor.aggregate_root {
                add_verb(node, Verb::Rollcall);
            }
        }
        table
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Verbs registered under `alias`, if the alias exists.
    pub fn verbs(&self, alias: &str) -> Option<&[Verb]> {
        self.node(alias).map(|node| node.verbs.as_slice())
    }

    /// Run `<alias> <verb>` against the given collaborators.
    pub fn dispatch(
        &self,
        alias: &str,
        verb: &str,
        oracle: &dyn ModulePresenceOracle,
        locator: &dyn ResourceLocator,
    ) -> Result<CommandReply> {
        let Some(node) = self.node(alias) else {
            bail!(
                "unknown module '{alias}'; expected one of: {}",
                self.aliases().join(", ")
            );
        };
        let Some(parsed) = Verb::parse(verb).filter(|v| node.verbs.contains(v)) else {
            let valid: Vec<_> = node.verbs.iter().map(|v| v.as_str()).collect();
            bail!(
                "'{verb}' is not available for {alias}; expected one of: {}",
                valid.join(", ")
            );
        };

        let descriptor = node.descriptor;
        let reply = match parsed {
            Verb::Version => module_reply(descriptor, parsed, oracle, locator, render_version),
            Verb::Dependencies => {
                module_reply(descriptor, parsed, oracle, locator, render_dependencies)
            }
            Verb::Features => module_reply(descriptor, parsed, oracle, locator, render_features),
            Verb::Rollcall => rollcall_reply(self.catalog, oracle, locator),
        };
        Ok(reply)
    }

    /// One usage line per registered command.
    pub fn usage(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| {
                let verbs: Vec<_> = node.verbs.iter().map(|v| v.as_str()).collect();
                format!(
                    "{} {} {}",
                    self.root,
                    node.descriptor.command_alias,
                    verbs.join("|")
                )
            })
            .collect()
    }

    /// Tab-separated alias, identifier, and display name per module.
    pub fn describe(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| {
                let descriptor = node.descriptor;
                format!(
                    "{}\t{}\t{}",
                    descriptor.command_alias, descriptor.identifier, descriptor.display_name
                )
            })
            .collect()
    }

    fn aliases(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .map(|node| node.descriptor.command_alias.as_str())
            .collect()
    }

    fn node(&self, alias: &str) -> Option<&CommandNode<'c>> {
        self.nodes
            .iter()
            .find(|node| node.descriptor.command_alias.as_str() == alias)
    }

    // Registration is idempotent: an alias that already has a node keeps it.
    fn find_or_create(&mut self, descriptor: &'c ModuleDescriptor) -> &mut CommandNode<'c> {
        let alias: &CommandAlias = &descriptor.command_alias;
        let index = match self
            .nodes
            .iter()
            .position(|node| &node.descriptor.command_alias == alias)
        {
            Some(index) => index,
            None => {
                self.nodes.push(CommandNode {
                    descriptor,
                    verbs: Vec::new(),
                });
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[index]
    }
}

fn add_verb(node: &mut CommandNode<'_>, verb: Verb) {
    if !node.verbs.contains(&verb) {
        node.verbs.push(verb);
    }
}

type Render = fn(&str, &ModuleMetadata) -> (Vec<String>, Value);

fn module_reply(
    descriptor: &ModuleDescriptor,
    verb: Verb,
    oracle: &dyn ModulePresenceOracle,
    locator: &dyn ResourceLocator,
    render: Render,
) -> CommandReply {
    let name = &descriptor.display_name;
    let mut payload = json!({
        "module": descriptor.identifier,
        "display_name": name,
        "present": false,
    });
    let Some(metadata) = resolve(descriptor, oracle, locator) else {
        return CommandReply {
            outcome: Outcome::Failure,
            lines: vec![format!("{name} is not present on this server.")],
            payload,
        };
    };

    let (lines, value) = render(name, &metadata);
    payload["present"] = Value::Bool(true);
    payload[verb.as_str()] = value;
    CommandReply {
        outcome: Outcome::Success,
        lines,
        payload,
    }
}

fn render_version(name: &str, metadata: &ModuleMetadata) -> (Vec<String>, Value) {
    (
        vec![format!("{name} version: {}", metadata.version)],
        json!(metadata.version),
    )
}

fn render_dependencies(name: &str, metadata: &ModuleMetadata) -> (Vec<String>, Value) {
    (
        list_lines(name, "dependency", "dependencies", &metadata.dependencies),
        json!(metadata.dependencies),
    )
}

fn render_features(name: &str, metadata: &ModuleMetadata) -> (Vec<String>, Value) {
    (
        list_lines(name, "feature", "features", &metadata.features),
        json!(metadata.features),
    )
}

fn list_lines(name: &str, singular: &str, plural: &str, items: &[String]) -> Vec<String> {
    if items.is_empty() {
        return vec![format!("No {singular} information available for {name}.")];
    }
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(format!("{name} {plural}:"));
    lines.extend(items.iter().cloned());
    lines
}

fn rollcall_reply(
    catalog: &RegistryCatalog,
    oracle: &dyn ModulePresenceOracle,
    locator: &dyn ResourceLocator,
) -> CommandReply {
    let entries = summarize(catalog, oracle, locator);
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push("Hellas suite rollcall:".to_string());
    lines.extend(entries.iter().map(|entry| format!("- {entry}")));
    CommandReply {
        outcome: Outcome::Success,
        lines,
        payload: json!({ "rollcall": entries }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::{MemoryLocator, StaticOracle};

    fn fixtures() -> (StaticOracle, MemoryLocator) {
        let oracle = StaticOracle::new()
            .with_module("hellasaudio", Some("2.0.0"))
            .with_module("hellasdeck", Some("1.0.3"))
            .with_module("hellashelper", Some("1.2.0"));
        let locator = MemoryLocator::new().with_resource(
            "hellasaudio",
            "config/hellasaudio.json",
            r#"{"version":"2.1.0","dependencies":["hellascontrol","hellaslibrary"],"features":["spatial-audio"]}"#,
        );
        (oracle, locator)
    }

    #[test]
    fn only_aggregate_root_gets_rollcall() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, DEFAULT_COMMAND_ROOT);
        assert_eq!(
            table.verbs("helper"),
            Some(&[Verb::Version, Verb::Dependencies, Verb::Features, Verb::Rollcall][..])
        );
        assert_eq!(table.verbs("hellasdeck"), Some(&Verb::PER_MODULE[..]));
        assert_eq!(table.verbs("hellashelper"), None);
        assert_eq!(table.usage().len(), catalog.len());
        assert_eq!(table.usage()[0], "hellas hellasaudio version|dependencies|features");
    }

    #[test]
    fn version_reply_uses_resolved_version() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, DEFAULT_COMMAND_ROOT);
        let (oracle, locator) = fixtures();

        let reply = table
            .dispatch("hellasaudio", "version", &oracle, &locator)
            .unwrap();
        assert_eq!(reply.outcome, Outcome::Success);
        assert_eq!(reply.lines, vec!["HellasAudio version: 2.1.0"]);
        assert_eq!(reply.payload["version"], "2.1.0");

        let reply = table
            .dispatch("hellasdeck", "version", &oracle, &locator)
            .unwrap();
        assert_eq!(reply.lines, vec!["HellasDeck version: 1.0.3"]);
    }

    #[test]
    fn list_replies_have_header_or_placeholder() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, DEFAULT_COMMAND_ROOT);
        let (oracle, locator) = fixtures();

        let reply = table
            .dispatch("hellasaudio", "dependencies", &oracle, &locator)
            .unwrap();
        assert_eq!(
            reply.lines,
            vec!["HellasAudio dependencies:", "hellascontrol", "hellaslibrary"]
        );
        assert_eq!(reply.payload["dependencies"][1], "hellaslibrary");

        let reply = table
            .dispatch("hellasdeck", "features", &oracle, &locator)
            .unwrap();
        assert_eq!(reply.outcome, Outcome::Success);
        assert_eq!(
            reply.lines,
            vec!["No feature information available for HellasDeck."]
        );

        let reply = table
            .dispatch("hellasdeck", "dependencies", &oracle, &locator)
            .unwrap();
        assert_eq!(
            reply.lines,
            vec!["No dependency information available for HellasDeck."]
        );
    }

    #[test]
    fn absent_module_is_a_failure_reply() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, DEFAULT_COMMAND_ROOT);
        let (oracle, locator) = fixtures();

        for verb in ["version", "dependencies", "features"] {
            let reply = table
                .dispatch("hellaswilds", verb, &oracle, &locator)
                .unwrap();
            assert_eq!(reply.outcome, Outcome::Failure);
            assert_eq!(reply.outcome.exit_code(), 1);
            assert_eq!(
                reply.lines,
                vec!["HellasWilds is not present on this server."]
            );
            assert_eq!(reply.payload["present"], false);
        }
    }

    #[test]
    fn rollcall_lists_every_module() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, DEFAULT_COMMAND_ROOT);
        let (oracle, locator) = fixtures();

        let reply = table
            .dispatch("helper", "rollcall", &oracle, &locator)
            .unwrap();
        assert_eq!(reply.outcome, Outcome::Success);
        assert_eq!(reply.lines.len(), catalog.len() + 1);
        assert_eq!(reply.lines[0], "Hellas suite rollcall:");
        assert_eq!(reply.lines[1], "- HellasAudio: 2.1.0");
        assert_eq!(reply.lines[4], "- HellasDeck: 1.0.3");
        assert_eq!(reply.lines[13], "- HellasWilds: missing");
        assert_eq!(reply.payload["rollcall"][12]["status"]["state"], "missing");
    }

    #[test]
    fn unknown_alias_or_verb_is_a_usage_error() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, DEFAULT_COMMAND_ROOT);
        let (oracle, locator) = fixtures();

        let err = table
            .dispatch("hellasnope", "version", &oracle, &locator)
            .unwrap_err();
        assert!(err.to_string().contains("unknown module 'hellasnope'"));
        assert!(err.to_string().contains("helper"));

        let err = table
            .dispatch("hellasdeck", "rollcall", &oracle, &locator)
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("'rollcall' is not available for hellasdeck")
        );
    }

    #[test]
    fn describe_lists_alias_identifier_and_name() {
        let catalog = RegistryCatalog::hellas_suite();
        let table = CommandTable::build(&catalog, "hx");
        assert_eq!(table.root(), "hx");
        assert!(
            table
                .describe()
                .contains(&"helper\thellashelper\tHellasHelper".to_string())
        );
    }
}
