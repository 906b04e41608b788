use indexmap::IndexMap;
use join_value::JoinValue;
use thiserror::Error;

/// One occurrence of a field in a selection set, before merging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    name: String,
    alias: Option<String>,
    arguments: Vec<(String, JoinValue)>,
    nested_selections: Vec<Selection>,
}

impl Selection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<JoinValue>) -> Self {
        self.arguments.push((name.into(), value.into()));
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.nested_selections.push(selection);
        self
    }

    pub fn with_selections(mut self, selections: impl IntoIterator<Item = Selection>) -> Self {
        self.nested_selections.extend(selections);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name of the value in the result: the alias if there is one.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &[(String, JoinValue)] {
        &self.arguments
    }

    pub fn nested_selections(&self) -> &[Selection] {
        &self.nested_selections
    }

    pub(crate) fn into_parts(self) -> (String, Vec<(String, JoinValue)>, Vec<Selection>) {
        (self.name, self.arguments, self.nested_selections)
    }

    fn same_arguments(&self, other: &Selection) -> bool {
        let mut ours: Vec<_> = self.arguments.iter().collect();
        let mut theirs: Vec<_> = other.arguments.iter().collect();

        ours.sort();
        theirs.sort();

        ours == theirs
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("`{key}` {reason}")]
pub struct SelectionConflict {
    pub key: String,
    pub reason: String,
}

/// Merges selections sharing a key into the first of them, in order of first
/// appearance. Children of later occurrences are appended to the children of
/// the first; they are merged in turn when the next level is resolved.
pub fn merge_selections(selections: Vec<Selection>) -> Result<Vec<Selection>, SelectionConflict> {
    let mut merged: IndexMap<String, Selection> = IndexMap::with_capacity(selections.len());

    for selection in selections {
        match merged.get_mut(selection.key()) {
            None => {
                merged.insert(selection.key().to_owned(), selection);
            }

            Some(existing) if existing.name != selection.name => {
                return Err(SelectionConflict {
                    key: selection.key().to_owned(),
                    reason: format!(
                        "selects both `{}` and `{}`; use different aliases.",
                        existing.name, selection.name
                    ),
                });
            }

            Some(existing) if !existing.same_arguments(&selection) => {
                return Err(SelectionConflict {
                    key: selection.key().to_owned(),
                    reason: format!(
                        "selects `{}` with different arguments; use different aliases.",
                        selection.name
                    ),
                });
            }

            Some(existing) => existing.nested_selections.extend(selection.nested_selections),
        }
    }

    Ok(merged.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_key_merges_children_in_order() {
        let merged = merge_selections(vec![
            Selection::new("author").with_selection(Selection::new("name")),
            Selection::new("title"),
            Selection::new("author")
                .with_selection(Selection::new("id"))
                .with_selection(Selection::new("name")),
        ])
        .unwrap();

        assert_eq!(
            merged,
            vec![
                Selection::new("author").with_selections([
                    Selection::new("name"),
                    Selection::new("id"),
                    Selection::new("name"),
                ]),
                Selection::new("title"),
            ]
        );
    }

    #[test]
    fn merging_merged_selections_changes_nothing() {
        let selections = vec![
            Selection::new("title"),
            Selection::new("title"),
            Selection::new("title").with_alias("name"),
        ];

        let once = merge_selections(selections).unwrap();
        let twice = merge_selections(once.clone()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.iter().map(Selection::key).collect::<Vec<_>>(), vec!["title", "name"]);
    }

    #[test]
    fn different_aliases_stay_independent() {
        let merged = merge_selections(vec![
            Selection::new("author").with_alias("a").with_argument("id", 1),
            Selection::new("author").with_alias("b").with_argument("id", 2),
        ])
        .unwrap();

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn argument_order_does_not_matter() {
        let merged = merge_selections(vec![
            Selection::new("books").with_argument("a", 1).with_argument("b", 2),
            Selection::new("books").with_argument("b", 2).with_argument("a", 1),
        ])
        .unwrap();

        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn same_key_for_different_fields_is_a_conflict() {
        let err = merge_selections(vec![Selection::new("title"), Selection::new("id").with_alias("title")]).unwrap_err();

        assert_eq!(err.key, "title");
        assert_eq!(err.to_string(), "`title` selects both `title` and `id`; use different aliases.");
    }

    #[test]
    fn same_key_with_different_arguments_is_a_conflict() {
        let err = merge_selections(vec![
            Selection::new("author").with_argument("id", 1),
            Selection::new("author").with_argument("id", 2),
        ])
        .unwrap_err();

        assert_eq!(err.key, "author");
    }
}
