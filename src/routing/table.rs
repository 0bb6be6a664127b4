//! Route table module
//!
//! An ordered list of route records indexed by method, then by exact path.
//! No parameters, no wildcards, no prefixes.

use hyper::Method;
use std::collections::HashMap;

use crate::config::{ControllerKind, MiddlewareKind, RouteSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
    pub controller: ControllerKind,
    pub middlewares: Vec<MiddlewareKind>,
}

/// Outcome of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Matched(&'a RouteEntry),
    NotFound,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<Method, HashMap<String, usize>>,
}

impl RouteTable {
    /// Build the table, rejecting bad methods, relative paths and duplicates
    pub fn from_specs(specs: &[RouteSpec]) -> Result<Self, String> {
        let mut table = Self::default();
        for spec in specs {
            let method = Method::from_bytes(spec.method.to_ascii_uppercase().as_bytes())
                .map_err(|e| format!("Invalid method '{}' for {}: {e}", spec.method, spec.path))?;
            table.insert(RouteEntry {
                method,
                path: spec.path.clone(),
                controller: spec.controller,
                middlewares: spec.middlewares.clone(),
            })?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, entry: RouteEntry) -> Result<(), String> {
        if !entry.path.starts_with('/') {
            return Err(format!("Route path must start with '/': '{}'", entry.path));
        }

        let paths = self.index.entry(entry.method.clone()).or_default();
        if paths.contains_key(&entry.path) {
            return Err(format!("Duplicate route: {} {}", entry.method, entry.path));
        }
        paths.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Exact (method, path) lookup; `path` must already exclude the query string
    pub fn route(&self, method: &Method, path: &str) -> Resolved<'_> {
        self.index
            .get(method)
            .and_then(|paths| paths.get(path))
            .map_or(Resolved::NotFound, |&i| Resolved::Matched(&self.entries[i]))
    }
}
