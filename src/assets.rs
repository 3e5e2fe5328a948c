//! Pending asynchronous model loads
//!
//! Loading a mesh takes longer than a frame. The simulation records what it
//! wants spawned together with the model to load; the platform starts the
//! loads, and reports each outcome with `resolve`. Outcomes are only applied
//! when the simulation drains them at the start of a tick, so lists never
//! change in the middle of a scan.

use crate::error::AssetLoadFailure;
use crate::sim::scene::Handle;

/// Identifies one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u32);

/// A load the platform still has to start
#[derive(Debug, Clone)]
pub struct LoadJob<T> {
    pub ticket: Ticket,
    pub model: String,
    pub payload: T,
}

/// A finished load, ready to be spliced into the game
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub payload: T,
    pub result: Result<Handle, AssetLoadFailure>,
}

#[derive(Debug, Clone)]
struct Request<T> {
    ticket: Ticket,
    model: String,
    payload: T,
    started: bool,
    result: Option<Result<Handle, AssetLoadFailure>>,
}

/// Queue of outstanding loads (oldest first)
#[derive(Debug, Clone)]
pub struct AssetQueue<T> {
    requests: Vec<Request<T>>,
    next_ticket: u32,
}

impl<T> Default for AssetQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AssetQueue<T> {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            next_ticket: 1,
        }
    }

    /// Ask for `model` to be loaded; `payload` is handed back once it resolves
    pub fn request(&mut self, model: impl Into<String>, payload: T) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.requests.push(Request {
            ticket,
            model: model.into(),
            payload,
            started: false,
            result: None,
        });
        ticket
    }

    /// Record the outcome of a load. Returns false for tickets that are no
    /// longer outstanding (e.g. dropped by a reset).
    pub fn resolve(&mut self, ticket: Ticket, result: Result<Handle, AssetLoadFailure>) -> bool {
        match self
            .requests
            .iter_mut()
            .find(|r| r.ticket == ticket && r.result.is_none())
        {
            Some(request) => {
                request.result = Some(result);
                true
            }
            None => {
                log::debug!("Ignoring resolution of stale ticket {}", ticket.0);
                false
            }
        }
    }

    /// Remove and return every resolved request, in request order
    pub fn drain_resolved(&mut self) -> Vec<Resolved<T>> {
        let mut out = Vec::new();
        let mut remaining = Vec::with_capacity(self.requests.len());
        for request in self.requests.drain(..) {
            match request.result {
                Some(result) => out.push(Resolved {
                    payload: request.payload,
                    result,
                }),
                None => remaining.push(Request {
                    result: None,
                    ..request
                }),
            }
        }
        self.requests = remaining;
        out
    }

    /// Drop every outstanding request. Returns the handles of models that
    /// already loaded but were never drained; the caller owns removing them.
    pub fn clear(&mut self) -> Vec<Handle> {
        self.requests
            .drain(..)
            .filter_map(|r| match r.result {
                Some(Ok(handle)) => Some(handle),
                _ => None,
            })
            .collect()
    }

    /// Number of requests not yet drained
    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl<T: Clone> AssetQueue<T> {
    /// Requests whose loads have not been started; marks them as started
    pub fn take_unstarted(&mut self) -> Vec<LoadJob<T>> {
        self.requests
            .iter_mut()
            .filter(|r| !r.started)
            .map(|r| {
                r.started = true;
                LoadJob {
                    ticket: r.ticket,
                    model: r.model.clone(),
                    payload: r.payload.clone(),
                }
            })
            .collect()
    }

    /// Start and resolve every pending load synchronously (headless hosts)
    pub fn resolve_all_with<F>(&mut self, mut load: F)
    where
        F: FnMut(&LoadJob<T>) -> Result<Handle, AssetLoadFailure>,
    {
        for job in self.take_unstarted() {
            let result = load(&job);
            self.resolve(job.ticket, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(model: &str) -> AssetLoadFailure {
        AssetLoadFailure {
            model: model.to_string(),
            reason: "404".to_string(),
        }
    }

    #[test]
    fn test_unresolved_requests_stay_queued() {
        let mut queue = AssetQueue::new();
        queue.request("Tree_Apple_01.obj", 1u32);
        queue.request("Crown_0.obj", 2u32);

        assert!(queue.drain_resolved().is_empty());
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn test_drain_returns_in_request_order() {
        let mut queue = AssetQueue::new();
        let a = queue.request("a", 'a');
        let b = queue.request("b", 'b');
        let c = queue.request("c", 'c');

        assert!(queue.resolve(c, Ok(Handle(30))));
        assert!(queue.resolve(a, Err(failure("a"))));

        let drained = queue.drain_resolved();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].payload, 'a');
        assert!(drained[0].result.is_err());
        assert_eq!(drained[1].payload, 'c');
        assert_eq!(drained[1].result, Ok(Handle(30)));

        // b still outstanding
        assert_eq!(queue.pending(), 1);
        assert!(queue.resolve(b, Ok(Handle(20))));
        assert_eq!(queue.drain_resolved()[0].payload, 'b');
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stale_ticket_after_clear_is_ignored() {
        let mut queue = AssetQueue::new();
        let ticket = queue.request("Crown_0.obj", ());
        queue.clear();
        assert!(!queue.resolve(ticket, Ok(Handle(1))));
        assert!(queue.drain_resolved().is_empty());

        // New tickets never alias dropped ones
        let fresh = queue.request("Crown_0.obj", ());
        assert_ne!(fresh, ticket);
    }

    #[test]
    fn test_clear_hands_back_loaded_models() {
        let mut queue = AssetQueue::new();
        let a = queue.request("a", 0u8);
        let b = queue.request("b", 1u8);
        queue.request("c", 2u8);
        queue.resolve(a, Ok(Handle(5)));
        queue.resolve(b, Err(failure("b")));

        // Only the successful, undrained load has a model to remove
        assert_eq!(queue.clear(), vec![Handle(5)]);
        assert!(queue.is_empty());
        assert!(queue.clear().is_empty());
    }

    #[test]
    fn test_take_unstarted_only_once() {
        let mut queue = AssetQueue::new();
        queue.request("a", 0u8);
        assert_eq!(queue.take_unstarted().len(), 1);
        assert!(queue.take_unstarted().is_empty());
        queue.request("b", 1u8);
        let jobs = queue.take_unstarted();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].model, "b");
    }

    #[test]
    fn test_resolve_all_with() {
        let mut queue = AssetQueue::new();
        queue.request("good", 1u32);
        queue.request("bad", 2u32);
        queue.resolve_all_with(|job| {
            if job.model == "good" {
                Ok(Handle(job.payload))
            } else {
                Err(failure(&job.model))
            }
        });
        let drained = queue.drain_resolved();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].result, Ok(Handle(1)));
        assert!(drained[1].result.is_err());
    }
}
