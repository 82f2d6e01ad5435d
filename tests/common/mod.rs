#![allow(dead_code)]

use anyhow::Result;
use frea::{
    engine::{ConvertRequest, Engine, EngineDiag},
    error::EngineError,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Writes a small file per request and records every call. Fails on call `fail_at`.
#[derive(Default)]
pub struct StubEngine {
    pub fail_at: Option<usize>,
    pub calls: RefCell<Vec<ConvertRequest>>,
}

impl StubEngine {
    pub fn failing_at(k: usize) -> Self {
        Self {
            fail_at: Some(k),
            ..Default::default()
        }
    }

    pub fn sources(&self) -> Vec<PathBuf> {
        self.calls.borrow().iter().map(|r| r.source.clone()).collect()
    }
}

impl Engine for StubEngine {
    fn doctor(&self) -> Result<EngineDiag> {
        Ok(EngineDiag {
            exe: "stub".into(),
            version: Some("0".into()),
            ok: true,
            error: None,
        })
    }

    fn convert(&self, req: &ConvertRequest) -> Result<(), EngineError> {
        let n = self.calls.borrow().len();
        self.calls.borrow_mut().push(req.clone());
        if self.fail_at == Some(n) {
            return Err(EngineError::Failed {
                code: Some(64),
                reason: "unexpected end of input".into(),
            });
        }
        std::fs::write(
            &req.destination,
            format!("{} -> {}", req.source.display(), req.target_format),
        )?;
        Ok(())
    }
}

pub fn touch(dir: &Path, rel: &str, body: &str) -> PathBuf {
    let p = dir.join(rel);
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(&p, body).expect("write fixture");
    p
}
