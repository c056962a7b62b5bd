//! Association resolution.
//!
//! # Responsibility
//! - Turn each entity's association nodes into target entity names.
//! - Classify every association attribute into one closed variant.
//!
//! # Invariants
//! - Single and union targets come from reverse identity lookup only.
//! - Collection targets come from the element's declared table key.
//! - Shapes that cannot be resolved become `Association::Opaque`; resolution
//!   itself never fails.

use crate::schema::annotate::{annotate, NodeKind};
use crate::schema::definition::{EntityDescriptor, Schema};
use crate::schema::node::{SchemaNode, UnionSchema};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Suffix applied to single and union association fields on holders.
pub const SINGLE_ID_SUFFIX: &str = "Id";
/// Suffix applied to collection association fields on holders.
pub const COLLECTION_IDS_SUFFIX: &str = "Ids";

/// Resolved polymorphic target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTarget {
    /// Record attribute carrying the member tag.
    pub schema_attribute: String,
    /// Tag -> entity name for every member that resolved.
    pub members: BTreeMap<String, String>,
    /// Static target used when a raw value carries no embedded tag. Set only
    /// when the union has exactly one resolved member.
    pub fallback: Option<String>,
}

impl UnionTarget {
    pub fn entity_for_tag(&self, tag: &str) -> Option<&str> {
        self.members.get(tag).map(String::as_str)
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.members.values().any(|member| member == entity)
    }
}

/// Closed classification of one association attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Association {
    Single { target: String },
    Collection { target: String, table: String },
    Union(UnionTarget),
    /// Left untouched on holders: no traversal, no renaming.
    Opaque { kind: NodeKind },
}

impl Association {
    pub fn is_traversable(&self) -> bool {
        !matches!(self, Self::Opaque { .. })
    }

    /// Field name this attribute is exposed under on a holder.
    pub fn field_name(&self, attribute: &str) -> String {
        match self {
            Self::Single { .. } | Self::Union(_) => format!("{attribute}{SINGLE_ID_SUFFIX}"),
            Self::Collection { .. } => format!("{attribute}{COLLECTION_IDS_SUFFIX}"),
            Self::Opaque { .. } => attribute.to_string(),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Collection { .. } => "collection",
            Self::Union(_) => "union",
            Self::Opaque { .. } => "opaque",
        }
    }
}

/// Attribute -> association map of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAssociations {
    entries: BTreeMap<String, Association>,
}

impl ResolvedAssociations {
    pub fn get(&self, attribute: &str) -> Option<&Association> {
        self.entries.get(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Association)> {
        self.entries
            .iter()
            .map(|(attribute, association)| (attribute.as_str(), association))
    }

    /// Associations that get a traversal on holders.
    pub fn traversable(&self) -> impl Iterator<Item = (&str, &Association)> {
        self.iter()
            .filter(|(_, association)| association.is_traversable())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves every association declared on `descriptor`.
pub fn resolve_entity(schema: &Schema, descriptor: &EntityDescriptor) -> ResolvedAssociations {
    let entries = descriptor
        .associations
        .iter()
        .map(|(attribute, node)| {
            let association = resolve_node(schema, &descriptor.name, attribute, node);
            debug!(
                "event=association_resolved module=resolve status=ok entity={} attribute={} kind={}",
                descriptor.name,
                attribute,
                association.kind_str()
            );
            (attribute.clone(), association)
        })
        .collect();
    ResolvedAssociations { entries }
}

/// Resolves a union's members; `None` when no member resolves.
pub fn resolve_union(schema: &Schema, owner: &str, union: &UnionSchema) -> Option<UnionTarget> {
    let mut members = BTreeMap::new();
    for (tag, node) in &union.members {
        let resolved = match node {
            SchemaNode::Entity(entity) => schema.entity_name_of(*entity),
            _ => None,
        };
        match resolved {
            Some(entity) => {
                members.insert(tag.clone(), entity.to_string());
            }
            None => warn!(
                "event=association_unresolved module=resolve status=skip owner={} tag={} kind={}",
                owner,
                tag,
                annotate(node).as_str()
            ),
        }
    }

    if members.is_empty() {
        return None;
    }
    let fallback = if members.len() == 1 {
        members.values().next().cloned()
    } else {
        None
    };
    Some(UnionTarget {
        schema_attribute: union.schema_attribute.clone(),
        members,
        fallback,
    })
}

fn resolve_node(schema: &Schema, owner: &str, attribute: &str, node: &SchemaNode) -> Association {
    let kind = annotate(node);
    let resolved = match node {
        SchemaNode::Entity(entity) => schema
            .entity_name_of(*entity)
            .map(|target| Association::Single {
                target: target.to_string(),
            }),
        SchemaNode::Array(elements) => resolve_collection(schema, elements),
        SchemaNode::Union(union) => resolve_union(schema, owner, union).map(Association::Union),
        SchemaNode::Object(_) | SchemaNode::Values(_) => return Association::Opaque { kind },
        SchemaNode::Unrecognized(_) => None,
    };

    resolved.unwrap_or_else(|| {
        let detail = match node {
            SchemaNode::Unrecognized(reason) => reason.as_str(),
            _ => "target not registered in schema",
        };
        warn!(
            "event=association_unresolved module=resolve status=skip entity={} attribute={} kind={} detail={}",
            owner,
            attribute,
            kind.as_str(),
            detail
        );
        Association::Opaque { kind }
    })
}

fn resolve_collection(schema: &Schema, elements: &[SchemaNode]) -> Option<Association> {
    let [SchemaNode::Entity(element)] = elements else {
        return None;
    };
    let table = &schema.descriptor_of(*element)?.key;
    let target = schema.entity_name_for_key(table)?;
    Some(Association::Collection {
        target: target.to_string(),
        table: table.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::{resolve_entity, Association};
    use crate::schema::annotate::NodeKind;
    use crate::schema::definition::SchemaBuilder;
    use crate::schema::node::{SchemaNode, UnionSchema};
    use std::collections::BTreeMap;

    #[test]
    fn resolves_single_collection_and_union_targets() {
        let mut builder = SchemaBuilder::new();
        let person = builder.entity("Person", "people").expect("person");
        let book = builder.entity("Book", "books").expect("book");
        builder
            .associate(book, "writer", SchemaNode::entity(person))
            .expect("writer");
        builder
            .associate(book, "readers", SchemaNode::collection(person))
            .expect("readers");
        builder
            .associate(
                book,
                "about",
                SchemaNode::union(
                    UnionSchema::new("type")
                        .member("person", person)
                        .member("book", book),
                ),
            )
            .expect("about");
        let schema = builder.build();

        let resolved = resolve_entity(&schema, schema.entity("Book").expect("book"));
        assert_eq!(
            resolved.get("writer"),
            Some(&Association::Single {
                target: "Person".to_string()
            })
        );
        assert_eq!(
            resolved.get("readers"),
            Some(&Association::Collection {
                target: "Person".to_string(),
                table: "people".to_string(),
            })
        );
        let Some(Association::Union(union)) = resolved.get("about") else {
            panic!("about should resolve to a union");
        };
        assert_eq!(union.entity_for_tag("person"), Some("Person"));
        assert_eq!(union.entity_for_tag("book"), Some("Book"));
        assert_eq!(union.fallback, None);
        assert_eq!(resolved.traversable().count(), 3);
    }

    #[test]
    fn unresolvable_shapes_become_opaque() {
        let mut foreign_builder = SchemaBuilder::new();
        let foreign = foreign_builder.entity("Ghost", "ghosts").expect("ghost");

        let mut builder = SchemaBuilder::new();
        let tag = builder.entity("Tag", "tags").expect("tag");
        let post = builder.entity("Post", "posts").expect("post");
        builder
            .associate(post, "ghost", SchemaNode::entity(foreign))
            .expect("ghost");
        builder
            .associate(
                post,
                "pair",
                SchemaNode::Array(vec![SchemaNode::entity(tag), SchemaNode::entity(tag)]),
            )
            .expect("pair");
        builder
            .associate(post, "meta", SchemaNode::Object(BTreeMap::new()))
            .expect("meta");
        builder
            .associate(post, "weird", SchemaNode::Unrecognized("number".to_string()))
            .expect("weird");
        let schema = builder.build();

        let resolved = resolve_entity(&schema, schema.entity("Post").expect("post"));
        assert_eq!(
            resolved.get("ghost"),
            Some(&Association::Opaque {
                kind: NodeKind::Entity
            })
        );
        assert_eq!(
            resolved.get("pair"),
            Some(&Association::Opaque {
                kind: NodeKind::Array
            })
        );
        assert_eq!(
            resolved.get("meta"),
            Some(&Association::Opaque {
                kind: NodeKind::Object
            })
        );
        assert_eq!(resolved.traversable().count(), 0);
        assert_eq!(resolved.len(), 4);
    }

    #[test]
    fn single_member_union_gets_static_fallback() {
        let mut builder = SchemaBuilder::new();
        let tag = builder.entity("Tag", "tags").expect("tag");
        let post = builder.entity("Post", "posts").expect("post");
        builder
            .associate(
                post,
                "label",
                SchemaNode::union(UnionSchema::new("type").member("tag", tag)),
            )
            .expect("label");
        let schema = builder.build();

        let resolved = resolve_entity(&schema, schema.entity("Post").expect("post"));
        let Some(Association::Union(union)) = resolved.get("label") else {
            panic!("label should resolve to a union");
        };
        assert_eq!(union.fallback.as_deref(), Some("Tag"));
    }

    #[test]
    fn field_names_follow_suffix_convention() {
        let single = Association::Single {
            target: "Author".to_string(),
        };
        let collection = Association::Collection {
            target: "Tag".to_string(),
            table: "tags".to_string(),
        };
        let opaque = Association::Opaque {
            kind: NodeKind::Object,
        };
        assert_eq!(single.field_name("author"), "authorId");
        assert_eq!(collection.field_name("tags"), "tagsIds");
        assert_eq!(opaque.field_name("meta"), "meta");
    }
}
