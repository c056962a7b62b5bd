//! Schema node annotation.
//!
//! Tags every association node with a closed kind so later passes dispatch on
//! data instead of probing node capabilities.

use crate::schema::definition::EntityDescriptor;
use crate::schema::node::SchemaNode;
use std::collections::BTreeMap;

/// Kind tag of one schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Entity,
    Array,
    Union,
    Object,
    Values,
    Unrecognized,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Array => "array",
            Self::Union => "union",
            Self::Object => "object",
            Self::Values => "values",
            Self::Unrecognized => "unrecognized",
        }
    }
}

pub fn annotate(node: &SchemaNode) -> NodeKind {
    match node {
        SchemaNode::Entity(_) => NodeKind::Entity,
        SchemaNode::Array(_) => NodeKind::Array,
        SchemaNode::Union(_) => NodeKind::Union,
        SchemaNode::Object(_) => NodeKind::Object,
        SchemaNode::Values(_) => NodeKind::Values,
        SchemaNode::Unrecognized(_) => NodeKind::Unrecognized,
    }
}

/// Annotates every association attribute of one entity.
pub fn annotate_entity(descriptor: &EntityDescriptor) -> BTreeMap<String, NodeKind> {
    descriptor
        .associations
        .iter()
        .map(|(attribute, node)| (attribute.clone(), annotate(node)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{annotate, annotate_entity, NodeKind};
    use crate::schema::definition::SchemaBuilder;
    use crate::schema::node::{SchemaNode, UnionSchema};
    use std::collections::BTreeMap;

    #[test]
    fn tags_each_node_shape() {
        let mut builder = SchemaBuilder::new();
        let tag = builder.entity("Tag", "tags").expect("tag");
        let post = builder.entity("Post", "posts").expect("post");
        builder
            .associate(post, "tags", SchemaNode::collection(tag))
            .expect("tags");
        builder
            .associate(post, "primary", SchemaNode::entity(tag))
            .expect("primary");
        builder
            .associate(
                post,
                "subject",
                SchemaNode::union(UnionSchema::new("type").member("tag", tag)),
            )
            .expect("subject");
        builder
            .associate(post, "meta", SchemaNode::Object(BTreeMap::new()))
            .expect("meta");
        builder
            .associate(post, "scores", SchemaNode::Values(Box::new(SchemaNode::entity(tag))))
            .expect("scores");
        let schema = builder.build();

        let kinds = annotate_entity(schema.entity("Post").expect("post"));
        assert_eq!(kinds["tags"], NodeKind::Array);
        assert_eq!(kinds["primary"], NodeKind::Entity);
        assert_eq!(kinds["subject"], NodeKind::Union);
        assert_eq!(kinds["meta"], NodeKind::Object);
        assert_eq!(kinds["scores"], NodeKind::Values);
    }

    #[test]
    fn unrecognized_stays_unrecognized() {
        let node = SchemaNode::Unrecognized("number".to_string());
        assert_eq!(annotate(&node), NodeKind::Unrecognized);
        assert_eq!(NodeKind::Unrecognized.as_str(), "unrecognized");
    }
}
