//! Unit tests for the verification service module

mod mocks;
