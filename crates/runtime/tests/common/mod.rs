//! Shared fixtures for runtime tests.

#![allow(dead_code)]

use ccore::testing::Scripted;
use conclave_runtime::{Config, Context, Paths, Search};
use futures_util::future::BoxFuture;
use std::path::Path;

/// Search stub answering every query with the same text.
pub struct FixedSearch(pub &'static str);

impl Search for FixedSearch {
    fn search<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, String> {
        Box::pin(async move { self.0.to_owned() })
    }
}

/// Default config with every path under `dir`.
pub fn config(dir: &Path) -> Config {
    Config {
        paths: Paths::under(dir),
        ..Config::default()
    }
}

/// A session context rooted at `dir`.
pub fn context(dir: &Path, gateway: Scripted) -> Context<Scripted> {
    context_with(gateway, config(dir))
}

/// A session context with a custom config.
pub fn context_with(gateway: Scripted, config: Config) -> Context<Scripted> {
    Context::new(gateway, config).with_search(FixedSearch("Rust is a systems language."))
}
