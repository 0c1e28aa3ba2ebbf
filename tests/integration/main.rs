//! Integration tests driving the scanner end to end with in-memory
//! collaborators.

mod mock_collaborators;
mod scan_loop;
