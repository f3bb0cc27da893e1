//! A container moving through decode, edit and encode one step at a time
//!
//! ```text
//! Unparsed --parse--> Parsed --assemble--> Editable --encode--> Encoded
//!     \                  \                   | edit
//!      `------------------`------------------`----> Failed
//! ```
//!
//! Any failed step, or a step taken from the wrong stage, ends the session in
//! [`Session::Failed`]. Nothing leaves a failed session but its error.

use tracing::{debug, warn};

use crate::{
    assemble::Assembler,
    config::{ExportOptions, ImportOptions},
    error::{Error, ErrorKind, Result},
    read::Container,
    registry::Registry,
    resolve::{ResolvedModel, Resolver},
    scene::SceneGraph,
    write::ContainerWriter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::derive::Display)]
pub enum Stage {
    Unparsed,
    Parsed,
    Editable,
    Encoded,
    #[display("Error({_0})")]
    Error(ErrorKind),
}

#[derive(Debug)]
pub enum Session {
    Unparsed(Vec<u8>),
    Parsed(ResolvedModel),
    Editable(SceneGraph),
    Encoded(Vec<u8>),
    Failed(Error),
}

impl Session {
    pub fn new(bytes: Vec<u8>) -> Self {
        Session::Unparsed(bytes)
    }

    pub fn stage(&self) -> Stage {
        match self {
            Session::Unparsed(_) => Stage::Unparsed,
            Session::Parsed(_) => Stage::Parsed,
            Session::Editable(_) => Stage::Editable,
            Session::Encoded(_) => Stage::Encoded,
            Session::Failed(err) => Stage::Error(err.kind()),
        }
    }

    fn stage_name(&self) -> &'static str {
        match self {
            Session::Unparsed(_) => "unparsed",
            Session::Parsed(_) => "parsed",
            Session::Editable(_) => "editable",
            Session::Encoded(_) => "encoded",
            Session::Failed(_) => "failed",
        }
    }

    fn settle<T>(result: Result<T>, next: impl FnOnce(T) -> Session) -> Session {
        match result {
            Ok(value) => next(value),
            Err(err) => {
                warn!(kind = %err.kind(), "session failed: {err}");
                Session::Failed(err)
            }
        }
    }

    fn misuse(self, action: &'static str) -> Session {
        match self {
            failed @ Session::Failed(_) => failed,
            other => Session::Failed(Error::InvalidTransition {
                stage: other.stage_name(),
                action,
            }),
        }
    }

    /// Reads the container and resolves every selected section
    pub fn parse(self, registry: &Registry, options: &ImportOptions) -> Session {
        let bytes = match self {
            Session::Unparsed(bytes) => bytes,
            other => return other.misuse("parse"),
        };
        let result = Container::read(&bytes, registry)
            .and_then(|container| Resolver::new(&container, registry, options).resolve_model());
        Self::settle(result, Session::Parsed)
    }

    /// Replaces raw indices with handles
    pub fn assemble(self, registry: &Registry) -> Session {
        let model = match self {
            Session::Parsed(model) => model,
            other => return other.misuse("assemble"),
        };
        Self::settle(Assembler::new(registry).assemble(model), Session::Editable)
    }

    /// Lets the host change the graph; an error from `f` fails the session
    pub fn edit(self, f: impl FnOnce(&mut SceneGraph) -> Result<()>) -> Session {
        let mut graph = match self {
            Session::Editable(graph) => graph,
            other => return other.misuse("edit"),
        };
        let result = f(&mut graph).map(|()| graph);
        Self::settle(result, Session::Editable)
    }

    pub fn encode(self, registry: &Registry, options: &ExportOptions) -> Session {
        let graph = match self {
            Session::Editable(graph) => graph,
            other => return other.misuse("encode"),
        };
        let result = ContainerWriter::new(registry, options.clone()).encode(graph);
        if let Ok(bytes) = &result {
            debug!(size = bytes.len(), "session encoded");
        }
        Self::settle(result, Session::Encoded)
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        match self {
            Session::Editable(graph) => Some(graph),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Session::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The encoded container, or the error that ended the session
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Session::Encoded(bytes) => Ok(bytes),
            Session::Failed(err) => Err(err),
            other => Err(Error::InvalidTransition {
                stage: other.stage_name(),
                action: "take bytes from",
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    use super::{Session, Stage};
    use crate::config::{ExportOptions, ImportOptions};
    use crate::error::{Error, ErrorKind, Result};
    use crate::read::ContainerKind;
    use crate::registry::Registry;
    use crate::scene::SceneGraph;
    use crate::types::tags;
    use crate::value::{Record, Value};
    use crate::write::ContainerWriter;

    fn animation_bytes() -> Result<Vec<u8>> {
        let graph = SceneGraph {
            kind: ContainerKind::Animation,
            root: Record::new(tags::ANIM, 1).with("name", Value::Text("walk".into())),
            collections: BTreeMap::new(),
        };
        ContainerWriter::new(Registry::builtin(), ExportOptions::default()).encode(graph)
    }

    #[test]
    fn full_pipeline() -> Result<()> {
        let registry = Registry::builtin();
        let bytes = animation_bytes()?;

        let session = Session::new(bytes.clone()).parse(registry, &ImportOptions::default());
        assert_eq!(session.stage(), Stage::Parsed);
        let session = session.assemble(registry);
        assert_eq!(session.stage(), Stage::Editable);
        assert_eq!(session.graph().and_then(|g| g.root.text("name")), Some("walk"));

        let session = session
            .edit(|graph| {
                graph.root.set("name", Value::Text("run".into()));
                Ok(())
            })
            .encode(registry, &ExportOptions::default());
        assert_eq!(session.stage(), Stage::Encoded);

        let encoded = session.into_bytes()?;
        assert_ne!(encoded, bytes);
        Ok(())
    }

    #[test]
    fn out_of_order_step_fails() {
        let session = Session::new(Vec::new()).encode(Registry::builtin(), &ExportOptions::default());
        assert_eq!(session.stage(), Stage::Error(ErrorKind::InvalidTransition));
        assert_eq!(
            session.error().map(ToString::to_string),
            Some("cannot encode a session in the unparsed stage".to_owned())
        );
    }

    #[test]
    fn failure_is_terminal() {
        let registry = Registry::builtin();
        let session = Session::new(vec![0; 8]).parse(registry, &ImportOptions::default());
        assert_eq!(session.stage(), Stage::Error(ErrorKind::TruncatedData));

        let session = session.assemble(registry);
        assert_eq!(session.stage(), Stage::Error(ErrorKind::TruncatedData));
        assert!(matches!(session.into_bytes(), Err(Error::TruncatedData { .. })));
    }

    #[test]
    fn failed_edit_ends_the_session() -> Result<()> {
        let registry = Registry::builtin();
        let session = Session::new(animation_bytes()?)
            .parse(registry, &ImportOptions::default())
            .assemble(registry)
            .edit(|_| {
                Err(Error::CorruptContainer {
                    reason: "host rejected the graph".into(),
                })
            });
        assert_eq!(session.stage(), Stage::Error(ErrorKind::CorruptContainer));
        Ok(())
    }
}
