//! Host crate for Tessera cross-crate integration tests. See `tests/`.
