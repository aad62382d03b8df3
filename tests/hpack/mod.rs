//! HPACK decoder integration tests

mod table_state;
