//! A small two-entity library used across the unit tests.

use crate::{schema::*, *};
use join_value::JoinValue;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Column equality filters, the query context of the fixture fetchers.
#[derive(Debug, Clone, Default)]
pub(crate) struct Filters(pub Vec<(String, JoinValue)>);

pub(crate) struct Library {
    pub root: EntityRef,
    pub book_fetches: Arc<AtomicUsize>,
    pub author_fetches: Arc<AtomicUsize>,
    _registry: EntityRegistry,
}

impl Library {
    pub fn new() -> Self {
        Self::with_books(vec![
            (1, "Leave It to Psmith", 1),
            (2, "Right Ho, Jeeves", 1),
            (3, "Catch-22", 2),
        ])
    }

    pub fn with_books(books: Vec<(i64, &'static str, i64)>) -> Self {
        let registry = EntityRegistry::new();
        let book_fetches = Arc::new(AtomicUsize::new(0));
        let author_fetches = Arc::new(AtomicUsize::new(0));

        let book_rows = books
            .into_iter()
            .map(|(id, title, author_id)| {
                vec![
                    ("id", JoinValue::Int(id)),
                    ("title", JoinValue::from(title)),
                    ("author_id", JoinValue::Int(author_id)),
                ]
            })
            .collect();

        let author_rows = vec![
            vec![("id", JoinValue::Int(1)), ("name", JoinValue::from("PG Wodehouse"))],
            vec![("id", JoinValue::Int(2)), ("name", JoinValue::from("Joseph Heller"))],
        ];

        let authors = registry.lazy("Author");
        let books = registry.lazy("Book");

        let book = EntityType::new("Book", table(book_rows, book_fetches.clone()), {
            let authors = authors.clone();

            move || {
                let author = RelationshipField::single(authors, all_rows).join("authorId", "id");

                vec![
                    ("id", Field::from(ImmediateField::int("id").required())),
                    ("title", ImmediateField::string("title").required().into()),
                    ("authorId", ImmediateField::int("author_id").required().into()),
                    ("author", author.clone().into()),
                    ("booksBySameAuthor", author.extract("books").into()),
                ]
            }
        });

        let author = EntityType::new("Author", table(author_rows, author_fetches.clone()), {
            let books = books.clone();

            move || {
                vec![
                    ("id", Field::from(ImmediateField::int("id").required())),
                    ("name", ImmediateField::string("name").required().into()),
                    (
                        "books",
                        RelationshipField::many(books, all_rows).join("id", "authorId").into(),
                    ),
                ]
            }
        });

        let root = EntityType::root(move || {
            let all_books = RelationshipField::many(books.clone(), all_rows);

            vec![
                ("books", Field::from(all_books.clone())),
                ("bookTitles", all_books.extract("title").into()),
                (
                    "author",
                    RelationshipField::single_or_null(authors, all_rows)
                        .argument(Argument::new("id", InputType::scalar(ScalarType::Int).non_null()), equals("id"))
                        .into(),
                ),
            ]
        });

        registry.register(book).unwrap();
        registry.register(author).unwrap();

        Self {
            root,
            book_fetches,
            author_fetches,
            _registry: registry,
        }
    }

    pub fn book_fetches(&self) -> usize {
        self.book_fetches.load(Ordering::SeqCst)
    }

    pub fn author_fetches(&self) -> usize {
        self.author_fetches.load(Ordering::SeqCst)
    }

    pub fn schema(&self) -> QuerySchemaRef {
        Arc::new(QuerySchema::build(self.root.clone()).unwrap())
    }

    pub async fn execute(&self, selections: Vec<Selection>) -> CoreResult<serde_json::Value> {
        let response = JoinExecutor
            .execute(Operation::new(None, selections), self.schema(), AmbientContext::empty())
            .await?;

        Ok(serde_json::to_value(response.into_map()).unwrap())
    }
}

pub(crate) fn all_rows(_: &Arguments, _: &QueryContext, _: &AmbientContext) -> CoreResult<QueryContext> {
    Ok(QueryContext::new(Filters::default()))
}

pub(crate) fn equals(
    column: &'static str,
) -> impl Fn(QueryContext, &JoinValue, &AmbientContext) -> CoreResult<QueryContext> + Send + Sync + 'static {
    move |query: QueryContext, value: &JoinValue, _: &AmbientContext| {
        let mut filters = query.downcast_ref::<Filters>().cloned().unwrap_or_default();
        filters.0.push((column.to_owned(), value.clone()));

        Ok(QueryContext::new(filters))
    }
}

/// A fetcher over in-memory rows that counts its calls.
pub(crate) fn table(rows: Vec<Vec<(&'static str, JoinValue)>>, fetches: Arc<AtomicUsize>) -> impl FetchImmediates {
    move |selections: &[Request], query: &QueryContext, _: &AmbientContext| -> CoreResult<Vec<Row>> {
        fetches.fetch_add(1, Ordering::SeqCst);

        let filters = query.downcast_ref::<Filters>().cloned().unwrap_or_default();
        let cell = |row: &[(&'static str, JoinValue)], column: &str| {
            row.iter()
                .find(|(name, _)| *name == column)
                .map(|(_, value)| value.clone())
                .unwrap_or(JoinValue::Null)
        };

        Ok(rows
            .iter()
            .filter(|row| filters.0.iter().all(|(column, value)| &cell(row, column) == value))
            .map(|row| {
                selections
                    .iter()
                    .map(|request| match request.field().as_immediate() {
                        Some(field) => cell(row, field.column()),
                        None => JoinValue::Null,
                    })
                    .collect()
            })
            .collect())
    }
}
