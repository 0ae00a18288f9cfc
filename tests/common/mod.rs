#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use serde_json::Value;

use winr8te_terminal::http_client::Transport;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_str(&read_fixture(name)).expect("fixture should be valid json")
}

/// In-memory backend. Paths without a canned response fail like a dead server.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Value>>,
    statuses: Mutex<HashMap<String, u16>>,
    gets: AtomicUsize,
    heads: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, body: Value) -> Self {
        self.set(path, body);
        self
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.statuses
            .lock()
            .expect("mock lock")
            .insert(path.to_string(), status);
        self
    }

    pub fn set(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .expect("mock lock")
            .insert(path.to_string(), body);
    }

    pub fn fail(&self, path: &str) {
        self.responses.lock().expect("mock lock").remove(path);
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn head_calls(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.get_calls() + self.head_calls()
    }
}

impl Transport for MockTransport {
    fn get_json(&self, path: &str) -> Result<Value> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("mock lock")
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {path}"))
    }

    fn head(&self, path: &str) -> Result<StatusCode> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().expect("mock lock").get(path) {
            Some(code) => Ok(StatusCode::from_u16(*code)?),
            None => Err(anyhow!("connection refused: {path}")),
        }
    }
}
