//! In-memory collaborators.
//!
//! `InMemoryServer` models a server's declared features plus one generated
//! declaration. Its writer handle shares state, so a reconciler can borrow the
//! server as inventory while the writer is borrowed mutably.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use fgen_reconcile::{
    DeclarationError, DeclarationWriter, FeatureInventory, FeatureScanner, FeatureSet,
    InventoryError, ScanOutcome, ScanRequest, VisibleFeatureCatalog,
};

pub const GENERATED_PATH: &str = "memory://configDropins/overrides/generated.xml";

#[derive(Debug, Default)]
struct ServerState {
    declared: FeatureSet,
    generated: Option<FeatureSet>,
    retracted: Option<FeatureSet>,
    fail_reads: bool,
    fail_writes: bool,
    calls: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryServer {
    state: Rc<RefCell<ServerState>>,
}

impl InMemoryServer {
    pub fn with_declared(declared: FeatureSet) -> Self {
        let s = Self::default();
        s.state.borrow_mut().declared = declared;
        s
    }

    /// Seed a previously generated declaration.
    pub fn with_generated(self, generated: FeatureSet) -> Self {
        self.state.borrow_mut().generated = Some(generated);
        self
    }

    pub fn fail_reads(&self, on: bool) {
        self.state.borrow_mut().fail_reads = on;
    }

    pub fn fail_writes(&self, on: bool) {
        self.state.borrow_mut().fail_writes = on;
    }

    pub fn declare(&self, feature: &str) {
        self.state.borrow_mut().declared.insert(feature.to_string());
    }

    pub fn generated(&self) -> Option<FeatureSet> {
        self.state.borrow().generated.clone()
    }

    /// Writer calls in order: `retract`, `restore`, `write`.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn writer(&self) -> InMemoryWriter {
        InMemoryWriter {
            state: Rc::clone(&self.state),
        }
    }
}

impl FeatureInventory for InMemoryServer {
    fn installed_features(&self) -> Result<FeatureSet, InventoryError> {
        let st = self.state.borrow();
        if st.fail_reads {
            return Err(InventoryError {
                source_path: PathBuf::from("memory://server.xml"),
                cause: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read denied"),
            });
        }
        let mut out = st.declared.clone();
        if let Some(g) = &st.generated {
            out.extend(g.iter().cloned());
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryWriter {
    state: Rc<RefCell<ServerState>>,
}

impl DeclarationWriter for InMemoryWriter {
    fn retract_previous(&mut self) -> Result<(), DeclarationError> {
        let mut st = self.state.borrow_mut();
        st.calls.push("retract");
        st.retracted = st.generated.take();
        Ok(())
    }

    fn restore_previous(&mut self) -> Result<(), DeclarationError> {
        let mut st = self.state.borrow_mut();
        st.calls.push("restore");
        if let Some(prev) = st.retracted.take() {
            st.generated = Some(prev);
        }
        Ok(())
    }

    fn write_declaration(&mut self, features: &FeatureSet) -> Result<PathBuf, DeclarationError> {
        let mut st = self.state.borrow_mut();
        st.calls.push("write");
        if st.fail_writes {
            return Err(DeclarationError {
                path: PathBuf::from(GENERATED_PATH),
                action: "write",
                cause: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "write denied"),
            });
        }
        st.retracted = None;
        st.generated = Some(features.clone());
        Ok(PathBuf::from(GENERATED_PATH))
    }
}

/// Fixed visible-feature catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog(pub FeatureSet);

impl VisibleFeatureCatalog for StaticCatalog {
    fn visible_features(&self) -> FeatureSet {
        self.0.clone()
    }
}

/// Scanner returning a canned outcome and recording every request.
#[derive(Debug)]
pub struct FakeScanner {
    outcome: ScanOutcome,
    requests: RefCell<Vec<ScanRequest>>,
}

impl FakeScanner {
    pub fn recommending(features: FeatureSet) -> Self {
        Self {
            outcome: ScanOutcome::Recommended(features),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            outcome: ScanOutcome::unavailable(reason),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ScanRequest> {
        self.requests.borrow().clone()
    }
}

impl FeatureScanner for FakeScanner {
    fn scan(&self, request: &ScanRequest) -> ScanOutcome {
        self.requests.borrow_mut().push(request.clone());
        self.outcome.clone()
    }
}
