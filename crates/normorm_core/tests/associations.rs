use normorm_core::{
    generate, EntityExtension, Extensions, GeneratorOptions, Orm, Related, Schema, SchemaNode,
    UnionSchema,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn library_orm(extensions: Extensions) -> Orm {
    let mut builder = Schema::builder();
    let author = builder.entity("Author", "authors").unwrap();
    let tag = builder.entity("Tag", "tags").unwrap();
    let book = builder.entity("Book", "books").unwrap();
    let review = builder.entity("Review", "reviews").unwrap();

    builder
        .associate(book, "author", SchemaNode::entity(author))
        .unwrap();
    builder
        .associate(book, "tags", SchemaNode::collection(tag))
        .unwrap();
    builder
        .associate(book, "meta", SchemaNode::Object(BTreeMap::new()))
        .unwrap();
    builder
        .associate(author, "books", SchemaNode::collection(book))
        .unwrap();
    builder
        .associate(
            review,
            "subject",
            SchemaNode::union(
                UnionSchema::new("type")
                    .member("book", book)
                    .member("author", author),
            ),
        )
        .unwrap();
    builder
        .associate(
            review,
            "pinned",
            SchemaNode::union(UnionSchema::new("type").member("tag", tag)),
        )
        .unwrap();

    generate(&builder.build(), extensions, GeneratorOptions::default()).unwrap()
}

fn state() -> Value {
    json!({
        "entities": {
            "authors": {
                "1": { "id": 1, "name": "A", "books": [10, 11, 99] },
                "2": { "id": 2, "name": "B" }
            },
            "books": {
                "10": { "id": 10, "title": "T", "author": 1, "tags": [5, 6], "meta": { "pages": 3 } },
                "11": { "id": 11, "title": "U", "author": 2, "tags": null },
                "12": { "id": 12, "title": "V" }
            },
            "tags": {
                "5": { "id": 5, "label": "x" },
                "6": { "id": 6, "label": "y" }
            },
            "reviews": {
                "100": { "id": 100, "subject": { "id": 10, "schema": "book" }, "pinned": 5 },
                "101": { "id": 101, "subject": { "id": 2, "schema": "authors" } },
                "102": { "id": 102, "subject": 10 }
            }
        }
    })
}

#[test]
fn book_author_example_resolves() {
    let orm = library_orm(Extensions::new());
    let state = state();

    let book = orm.select(&state, "Book", &json!(10)).unwrap();
    assert_eq!(book.field("authorId"), Some(&json!(1)));

    let author = book.related_one("author").unwrap();
    assert_eq!(author.entity_name(), "Author");
    assert_eq!(author.field("name"), Some(&json!("A")));
}

#[test]
fn traversal_matches_direct_lookup_of_raw_id() {
    let orm = library_orm(Extensions::new());
    let state = state();

    for book_id in [10, 11, 12] {
        let book = orm.select(&state, "Book", &json!(book_id)).unwrap();
        let via_traversal = book.related_one("author").map(|author| author.to_json());
        let via_lookup = book
            .attributes()
            .get("author")
            .and_then(|id| orm.select(&state, "Author", id))
            .map(|author| author.to_json());
        assert_eq!(via_traversal, via_lookup);
    }
}

#[test]
fn collection_traversal_selects_listed_ids_and_skips_missing() {
    let orm = library_orm(Extensions::new());
    let state = state();

    let book = orm.select(&state, "Book", &json!(10)).unwrap();
    assert_eq!(book.field("tagsIds"), Some(&json!([5, 6])));
    let labels: Vec<Value> = book
        .related_many("tags")
        .iter()
        .map(|tag| tag.field("label").cloned().unwrap())
        .collect();
    assert_eq!(labels, vec![json!("x"), json!("y")]);

    let author = orm.select(&state, "Author", &json!(1)).unwrap();
    let titles: Vec<Value> = author
        .related_many("books")
        .iter()
        .map(|book| book.field("title").cloned().unwrap())
        .collect();
    assert_eq!(titles, vec![json!("T"), json!("U")]);
}

#[test]
fn absent_references_select_nothing() {
    let orm = library_orm(Extensions::new());
    let state = state();

    let untagged = orm.select(&state, "Book", &json!(11)).unwrap();
    assert!(untagged.related_many("tags").is_empty());
    assert!(matches!(untagged.related("tags"), Some(Related::Many(ref tags)) if tags.is_empty()));

    let bare = orm.select(&state, "Book", &json!(12)).unwrap();
    assert!(bare.related_one("author").is_none());
    assert!(bare.related_many("tags").is_empty());
    assert!(matches!(bare.related("author"), Some(Related::One(None))));

    let author = orm.select(&state, "Author", &json!(2)).unwrap();
    assert!(author.related_many("books").is_empty());
}

#[test]
fn opaque_associations_are_untouched_and_not_traversable() {
    let orm = library_orm(Extensions::new());
    let state = state();

    let book = orm.select(&state, "Book", &json!(10)).unwrap();
    assert_eq!(book.field("meta"), Some(&json!({ "pages": 3 })));
    assert_eq!(book.field("metaId"), None);
    assert!(book.related("meta").is_none());
    assert!(book.related("title").is_none());
}

#[test]
fn union_embedded_pair_overrides_static_target() {
    let orm = library_orm(Extensions::new());
    let state = state();

    let on_book = orm.select(&state, "Review", &json!(100)).unwrap();
    assert_eq!(
        on_book.field("subjectId"),
        Some(&json!({ "id": 10, "schema": "book" }))
    );
    let subject = on_book.related_one("subject").unwrap();
    assert_eq!(subject.entity_name(), "Book");
    assert_eq!(subject.id(), Some(&json!(10)));

    let on_author = orm.select(&state, "Review", &json!(101)).unwrap();
    let subject = on_author.related_one("subject").unwrap();
    assert_eq!(subject.entity_name(), "Author");
    assert_eq!(subject.field("name"), Some(&json!("B")));
}

#[test]
fn union_without_embedded_tag_uses_static_fallback_only() {
    let orm = library_orm(Extensions::new());
    let state = state();

    let review = orm.select(&state, "Review", &json!(100)).unwrap();
    let pinned = review.related_one("pinned").unwrap();
    assert_eq!(pinned.entity_name(), "Tag");
    assert_eq!(review.field("pinnedId"), Some(&json!(5)));

    let ambiguous = orm.select(&state, "Review", &json!(102)).unwrap();
    assert!(ambiguous.related_one("subject").is_none());
    assert!(ambiguous.related_one("pinned").is_none());
}

#[test]
fn extensions_add_derived_methods() {
    let mut extensions = Extensions::new();
    extensions.insert(
        "Book".to_string(),
        EntityExtension::new()
            .with_method("shout", |book| {
                let title = book.field("title").and_then(Value::as_str).unwrap_or("");
                json!(title.to_uppercase())
            })
            .with_method("tagCount", |book| json!(book.related_many("tags").len())),
    );
    extensions.insert("Nobody".to_string(), EntityExtension::new());

    let orm = library_orm(extensions);
    let state = state();
    let book = orm.select(&state, "Book", &json!(10)).unwrap();

    assert_eq!(book.call("shout"), Some(json!("T")));
    assert_eq!(book.call("tagCount"), Some(json!(2)));
    assert_eq!(book.call("missing"), None);

    let author = orm.select(&state, "Author", &json!(1)).unwrap();
    assert_eq!(author.call("shout"), None);
}

#[test]
fn denormalize_expands_to_requested_depth() {
    let orm = library_orm(Extensions::new());
    let state = state();
    let book = orm.select(&state, "Book", &json!(10)).unwrap();

    assert_eq!(book.denormalize(0), book.to_json());

    let expanded = book.denormalize(1);
    assert_eq!(expanded["authorId"], json!(1));
    assert_eq!(expanded["author"]["name"], json!("A"));
    assert_eq!(expanded["author"]["booksIds"], json!([10, 11, 99]));
    assert!(expanded["author"].get("books").is_none());
    assert_eq!(expanded["tags"][1]["label"], json!("y"));
    assert_eq!(expanded["meta"], json!({ "pages": 3 }));

    let deeper = book.denormalize(2);
    assert_eq!(deeper["author"]["books"][1]["title"], json!("U"));
}

#[test]
fn holders_serialize_projected_fields() {
    let orm = library_orm(Extensions::new());
    let state = state();
    let book = orm.select(&state, "Book", &json!(10)).unwrap();

    let serialized = serde_json::to_value(&book).unwrap();
    assert_eq!(serialized, book.to_json());
    assert_eq!(serialized["tagsIds"], json!([5, 6]));
    assert!(serialized.get("author").is_none());
}
