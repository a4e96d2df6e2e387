//! Prediction sources.
//!
//! [`PredictionSource`] is the seam between the UI and whatever produces
//! binding predictions. The only implementation shipped is [`MockPredictor`],
//! which draws labels and scores at random. A remote service can implement
//! the same trait; the UI always calls it through [`PredictionWorker`], so a
//! slow or failing source never blocks the event loop.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::model::{PredictionRecord, PredictionRequest};

/// MHC pseudo-sequence reported by the mock predictor for every allele.
pub const MHC_PSEUDO_SEQUENCE: &str = "YFAMYQENMAHTDANTLYIIRDYTWVARVYRGY";

/// Errors a prediction source may report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Prediction service error: {0}")]
    Service(String),
}

/// Result type for prediction operations.
pub type PredictionResult<T> = Result<T, PredictionError>;

/// Something that turns a request into one record per sequence, in order.
pub trait PredictionSource: Send {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn predict(&mut self, request: &PredictionRequest) -> PredictionResult<Vec<PredictionRecord>>;
}

/// Random predictions: fair-coin labels and uniform scores in [0, 1).
#[derive(Debug)]
pub struct MockPredictor {
    rng: StdRng,
}

impl MockPredictor {
    /// Creates a predictor seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a predictor with reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionSource for MockPredictor {
    fn name(&self) -> &str {
        "mock"
    }

    fn predict(&mut self, request: &PredictionRequest) -> PredictionResult<Vec<PredictionRecord>> {
        // Ids only need to be unique within one result list
        let batch: u32 = self.rng.random();

        let records = request
            .sequences
            .iter()
            .enumerate()
            .map(|(idx, peptide)| PredictionRecord {
                id: format!("{:08x}-{:04}", batch, idx),
                allele: request.allele,
                mhc_sequence: MHC_PSEUDO_SEQUENCE.to_string(),
                peptide: peptide.clone(),
                label: u8::from(self.rng.random_bool(0.5)),
                score: self.rng.random::<f64>(),
            })
            .collect();

        Ok(records)
    }
}

/// Runs a prediction source on a background thread.
///
/// Requests are handled one at a time, in the order they were submitted.
pub struct PredictionWorker {
    requests: Option<Sender<PredictionRequest>>,
    replies: Receiver<PredictionResult<Vec<PredictionRecord>>>,
    handle: Option<JoinHandle<()>>,
}

impl PredictionWorker {
    /// Moves `source` to a new worker thread.
    pub fn spawn(mut source: Box<dyn PredictionSource>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<PredictionRequest>();
        let (reply_tx, reply_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for request in request_rx {
                log::debug!(
                    "{} predictor: {} sequences for {}",
                    source.name(),
                    request.len(),
                    request.allele
                );
                let result = source.predict(&request);
                if reply_tx.send(result).is_err() {
                    break;
                }
            }
            log::debug!("Prediction worker stopped");
        });

        Self {
            requests: Some(request_tx),
            replies: reply_rx,
            handle: Some(handle),
        }
    }

    /// Queues a request.
    pub fn submit(&self, request: PredictionRequest) -> PredictionResult<()> {
        self.requests
            .as_ref()
            .ok_or_else(worker_stopped)?
            .send(request)
            .map_err(|_| worker_stopped())
    }

    /// Returns a finished reply, if any, without blocking.
    pub fn try_recv(&self) -> Option<PredictionResult<Vec<PredictionRecord>>> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_stopped())),
        }
    }

    /// Waits up to `timeout` for a reply.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PredictionResult<Vec<PredictionRecord>>> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(worker_stopped())),
        }
    }
}

impl Drop for PredictionWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_stopped() -> PredictionError {
    PredictionError::Service("prediction worker has stopped".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::{Allele, InputFormat};

    fn request(sequences: &[&str]) -> PredictionRequest {
        PredictionRequest {
            sequences: sequences.iter().map(|s| s.to_string()).collect(),
            input_format: InputFormat::Peptide,
            allele: Allele::A0201,
        }
    }

    /// Always fails, standing in for an unreachable backend.
    struct Unreachable;

    impl PredictionSource for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn predict(&mut self, _request: &PredictionRequest) -> PredictionResult<Vec<PredictionRecord>> {
            Err(PredictionError::Network("connection refused".to_string()))
        }
    }

    #[test]
    fn test_one_record_per_sequence_in_order() {
        let mut predictor = MockPredictor::with_seed(7);
        let records = predictor
            .predict(&request(&["SIINFEKL", "GILGFVFTL", "NLVPMVATV"]))
            .unwrap();

        assert_eq!(records.len(), 3);
        let peptides: Vec<&str> = records.iter().map(|r| r.peptide.as_str()).collect();
        assert_eq!(peptides, vec!["SIINFEKL", "GILGFVFTL", "NLVPMVATV"]);
        for r in &records {
            assert_eq!(r.allele, Allele::A0201);
            assert_eq!(r.mhc_sequence, MHC_PSEUDO_SEQUENCE);
        }
    }

    #[test]
    fn test_label_and_score_ranges() {
        let mut predictor = MockPredictor::with_seed(42);
        let peptides: Vec<String> = (0..500).map(|i| format!("PEP{}", i)).collect();
        let refs: Vec<&str> = peptides.iter().map(String::as_str).collect();
        let records = predictor.predict(&request(&refs)).unwrap();

        assert!(records.iter().all(|r| r.label == 0 || r.label == 1));
        assert!(records.iter().all(|r| (0.0..1.0).contains(&r.score)));
        // Both labels should show up in 500 draws
        assert!(records.iter().any(|r| r.label == 0));
        assert!(records.iter().any(|r| r.label == 1));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut predictor = MockPredictor::new();
        let records = predictor.predict(&request(&["A"; 200])).unwrap();
        let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let req = request(&["SIINFEKL", "GILGFVFTL"]);
        let a = MockPredictor::with_seed(1).predict(&req).unwrap();
        let b = MockPredictor::with_seed(1).predict(&req).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = PredictionWorker::spawn(Box::new(MockPredictor::with_seed(3)));
        worker.submit(request(&["SIINFEKL"])).unwrap();

        let reply = worker.recv_timeout(Duration::from_secs(5)).expect("worker reply");
        assert_eq!(reply.unwrap()[0].peptide, "SIINFEKL");
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_worker_preserves_request_order() {
        let worker = PredictionWorker::spawn(Box::new(MockPredictor::with_seed(3)));
        worker.submit(request(&["FIRST"])).unwrap();
        worker.submit(request(&["SECOND", "SECOND"])).unwrap();

        let first = worker.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        let second = worker.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_worker_forwards_errors() {
        let worker = PredictionWorker::spawn(Box::new(Unreachable));
        worker.submit(request(&["SIINFEKL"])).unwrap();

        let reply = worker.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(reply, Err(PredictionError::Network("connection refused".to_string())));
    }
}
