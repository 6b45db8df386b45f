//! Workspace root. The crates live in `shared/`, `server/`, and `client/`;
//! this package only hosts the cross-crate integration and benchmark suites
//! under `tests/`.
