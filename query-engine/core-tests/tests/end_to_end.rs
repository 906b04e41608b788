mod common;

use common::TestEngine;
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::json;

const TWO_BOOKS: &str = indoc! {r#"
    [[tables]]
    name = "authors"
    columns = [
      { name = "id", type = "id" },
      { name = "name", type = "string" },
    ]
    rows = [
      { id = "A1", name = "Ann" },
      { id = "A2", name = "Bob" },
    ]

    [[tables]]
    name = "books"
    columns = [
      { name = "id", type = "id" },
      { name = "author_id", type = "id", references = "authors.id" },
    ]
    rows = [
      { id = "T1", author_id = "A1" },
      { id = "T2", author_id = "A2" },
    ]
    relationships = [
      { name = "author", target = "authors", cardinality = "single" },
    ]

    [[query]]
    name = "books"
    target = "books"
"#};

const DANGLING_AUTHOR: &str = indoc! {r#"
    [[tables]]
    name = "authors"
    columns = [
      { name = "id", type = "int" },
      { name = "name", type = "string" },
    ]
    rows = [{ id = 1, name = "Ann" }]

    [[tables]]
    name = "books"
    columns = [
      { name = "id", type = "int" },
      { name = "title", type = "string" },
      { name = "author_id", type = "int", references = "authors.id" },
    ]
    rows = [
      { id = 1, title = "Found", author_id = 1 },
      { id = 2, title = "Lost", author_id = 9 },
    ]
    relationships = [
      { name = "author", target = "authors", cardinality = "single_or_null" },
      { name = "strictAuthor", target = "authors", cardinality = "single" },
      { name = "firstAuthor", target = "authors", cardinality = "first_or_null" },
    ]

    [[query]]
    name = "books"
    target = "books"
"#};

#[tokio::test]
async fn each_relationship_level_is_fetched_once() {
    let engine = TestEngine::new(TWO_BOOKS);

    let data = engine.data("{ books { id author { name } } }").await;

    assert_eq!(
        data,
        json!({
            "books": [
                { "id": "T1", "author": { "name": "Ann" } },
                { "id": "T2", "author": { "name": "Bob" } },
            ]
        })
    );
    assert_eq!(engine.fetches("books"), 1);
    assert_eq!(engine.fetches("authors"), 1);
}

#[tokio::test]
async fn missing_optional_single_values_are_null() {
    let engine = TestEngine::new(DANGLING_AUTHOR);

    let data = engine.data("{ books { title author { name } } }").await;

    assert_eq!(
        data,
        json!({
            "books": [
                { "title": "Found", "author": { "name": "Ann" } },
                { "title": "Lost", "author": null },
            ]
        })
    );
}

#[tokio::test]
async fn first_or_null_tolerates_missing_values() {
    let engine = TestEngine::new(DANGLING_AUTHOR);

    let data = engine.data("{ books { firstAuthor { name } } }").await;

    assert_eq!(
        data,
        json!({ "books": [{ "firstAuthor": { "name": "Ann" } }, { "firstAuthor": null }] })
    );
}

#[tokio::test]
async fn strict_single_values_fail_the_request_when_missing() {
    let engine = TestEngine::new(DANGLING_AUTHOR);

    let (code, message) = engine.error("{ books { title strictAuthor { name } } }").await;

    assert_eq!(code, "J2003");
    assert_eq!(message, "Expected 1 value but got 0");
}

#[tokio::test]
async fn relationship_arguments_restrict_the_fetch() {
    let engine = TestEngine::library();

    let data = engine
        .data(r#"{ authors { name books(genre: "comedy") { title } } }"#)
        .await;

    assert_eq!(
        data,
        json!({
            "authors": [
                { "name": "PG Wodehouse", "books": [{ "title": "Leave It to Psmith" }, { "title": "Right Ho, Jeeves" }] },
                { "name": "Joseph Heller", "books": [] },
            ]
        })
    );

    let log = engine.fetch_log();

    assert_eq!(log.len(), 2);
    assert_eq!(log[1].table, "books");
    assert_eq!(log[1].rows, 2);
}

#[tokio::test]
async fn nested_levels_are_fetched_once_per_level() {
    let engine = TestEngine::library();

    let data = engine
        .data("{ books { title author { name books { title } } } }")
        .await;

    assert_eq!(data["books"][2]["author"]["books"], json!([{ "title": "Catch-22" }]));
    assert_eq!(engine.fetches("books"), 2);
    assert_eq!(engine.fetches("authors"), 1);
}

#[tokio::test]
async fn children_are_fetched_once_for_any_number_of_parents() {
    let engine = TestEngine::library();

    for (genre, parents) in [("horror", 0), ("satire", 1), ("comedy", 2)] {
        engine.reset();

        let data = engine
            .data(&format!(r#"{{ books(genre: "{genre}") {{ author {{ name }} }} }}"#))
            .await;

        assert_eq!(data["books"].as_array().unwrap().len(), parents);
        assert_eq!(engine.fetches("books"), 1, "{genre}");
        assert_eq!(engine.fetches("authors"), 1, "{genre}");
    }
}

#[tokio::test]
async fn extracted_root_fields_are_plain_values() {
    let engine = TestEngine::library();

    let data = engine.data("{ bookTitles }").await;

    assert_eq!(
        data,
        json!({ "bookTitles": ["Leave It to Psmith", "Right Ho, Jeeves", "Catch-22"] })
    );
}

#[tokio::test]
async fn extracted_relationships_flatten_the_intermediate_entity() {
    let engine = TestEngine::library();

    let data = engine
        .data(r#"{ books(genre: "satire") { title booksBySameAuthor { title } } }"#)
        .await;

    assert_eq!(
        data,
        json!({ "books": [{ "title": "Catch-22", "booksBySameAuthor": [{ "title": "Catch-22" }] }] })
    );
}

#[tokio::test]
async fn single_or_null_root_fields() {
    let engine = TestEngine::library();

    assert_eq!(
        engine.data("{ author(id: 2) { name } }").await,
        json!({ "author": { "name": "Joseph Heller" } })
    );
    assert_eq!(engine.data("{ author(id: 7) { name } }").await, json!({ "author": null }));
}

const EDITION_NOTES: &str = indoc! {r#"
    [[tables]]
    name = "editions"
    columns = [
      { name = "book_id", type = "int" },
      { name = "volume", type = "int" },
      { name = "label", type = "string" },
    ]
    rows = [
      { book_id = 1, volume = 2, label = "a" },
      { book_id = 2, volume = 1, label = "b" },
    ]
    relationships = [
      { name = "notes", target = "notes", join = [{ parent = "book_id", child = "book_id" }, { parent = "volume", child = "volume" }] },
    ]

    [[tables]]
    name = "notes"
    columns = [
      { name = "book_id", type = "int" },
      { name = "volume", type = "int" },
      { name = "text", type = "string" },
    ]
    rows = [
      { book_id = 1, volume = 2, text = "x" },
      { book_id = 1, volume = 1, text = "y" },
      { book_id = 2, volume = 2, text = "z" },
      { book_id = 2, volume = 1, text = "w" },
    ]

    [[query]]
    name = "editions"
    target = "editions"
"#};

#[tokio::test]
async fn composite_joins_match_the_whole_key() {
    let engine = TestEngine::new(EDITION_NOTES);

    let data = engine.data("{ editions { label notes { text } } }").await;

    assert_eq!(
        data,
        json!({
            "editions": [
                { "label": "a", "notes": [{ "text": "x" }] },
                { "label": "b", "notes": [{ "text": "w" }] },
            ]
        })
    );
    assert_eq!(engine.fetches("notes"), 1);
}
