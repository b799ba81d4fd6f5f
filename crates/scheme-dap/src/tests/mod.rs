//! Session-level tests driven through the recording backend.

mod support;
