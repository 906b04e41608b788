//! Integration tests of the join engine live in `tests/`.
