//! Delivery of RSVPs to the remote spreadsheet endpoint.
//!
//! The endpoint is cross-origin and its response is never readable, so the
//! client can only tell whether the request went out. Two delivery modes
//! exist: an opaque `no-cors` fetch, and a script-injection request whose
//! response calls back into a uniquely named global function.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use futures_channel::oneshot;
use ulid::Ulid;
use url::Url;

use crate::record::SubmissionRecord;

/// Query parameter naming the global function the endpoint should call.
pub const CALLBACK_PARAMETER: &str = "callback";

const CALLBACK_NAME_PREFIX: &str = "__rsvp_callback_";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Fire-and-forget `no-cors` GET; success means no network-level error.
    #[default]
    Opaque,
    /// Script-injection GET; success means the loaded script invoked the callback.
    Callback,
}

impl DeliveryMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "opaque" => Some(Self::Opaque),
            "callback" => Some(Self::Callback),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub mode: DeliveryMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteOutcome {
    Success,
    NotConfigured,
    NetworkError,
}

/// Builds the GET url for `record`, with the record fields as query pairs.
/// Returns `None` when `endpoint` is not an absolute url.
pub fn submission_url(endpoint: &str, record: &SubmissionRecord, callback: Option<&str>) -> Option<Url> {
    let mut url = Url::parse(endpoint.trim()).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }
    {
        let mut query = url.query_pairs_mut();
        for (name, value) in record.query_pairs() {
            query.append_pair(name, &value);
        }
        if let Some(callback) = callback {
            query.append_pair(CALLBACK_PARAMETER, callback);
        }
    }
    Some(url)
}

/// Correlation id of one callback-mode request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(Ulid);

impl CallbackId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Name of the global function the loaded script must call.
    pub fn callback_name(&self) -> String {
        format!("{CALLBACK_NAME_PREFIX}{}", self.0)
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

struct PendingCallback {
    sender: oneshot::Sender<RemoteOutcome>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

/// Outstanding callback-mode requests.
///
/// Each request settles at most once; settling runs its cleanup and forgets
/// the request whichever outcome arrives first.
#[derive(Default)]
pub struct CallbackRegistry {
    pending: RefCell<HashMap<CallbackId, PendingCallback>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> (CallbackId, oneshot::Receiver<RemoteOutcome>) {
        let id = CallbackId::new();
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().insert(
            id,
            PendingCallback {
                sender,
                cleanup: None,
            },
        );
        (id, receiver)
    }

    /// Attaches work to run when `id` settles (removing the script element,
    /// unregistering the global function). Runs immediately if `id` already settled.
    pub fn on_settle(&self, id: CallbackId, cleanup: Box<dyn FnOnce()>) {
        let settled = match self.pending.borrow_mut().get_mut(&id) {
            Some(callback) => {
                callback.cleanup = Some(cleanup);
                None
            }
            None => Some(cleanup),
        };
        if let Some(cleanup) = settled {
            cleanup();
        }
    }

    /// Settles `id`. Returns `false` if it had already settled.
    pub fn settle(&self, id: CallbackId, outcome: RemoteOutcome) -> bool {
        let Some(callback) = self.pending.borrow_mut().remove(&id) else {
            return false;
        };
        if let Some(cleanup) = callback.cleanup {
            cleanup();
        }
        if callback.sender.send(outcome).is_err() {
            log::debug!("Nobody awaits callback {}", id.callback_name());
        }
        true
    }

    pub fn is_pending(&self, id: CallbackId) -> bool {
        self.pending.borrow().contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

pub type PendingDelivery = Pin<Box<dyn Future<Output = RemoteOutcome>>>;

/// The network side of delivery.
pub trait Transport {
    /// Issues an opaque GET. Resolves to `Success` unless the request fails
    /// at the network level.
    fn fetch_opaque(&self, url: &Url) -> PendingDelivery;

    /// Loads `url` as a script. The implementation must arrange for `id` to
    /// be settled in `callbacks`: `Success` when the callback named by
    /// `id` is invoked, `NetworkError` when the script fails to load.
    fn load_script(&self, url: &Url, id: CallbackId, callbacks: Rc<CallbackRegistry>);
}

pub struct RemoteClient<T> {
    config: RemoteConfig,
    transport: T,
    callbacks: Rc<CallbackRegistry>,
}

impl<T: Transport> RemoteClient<T> {
    pub fn new(config: RemoteConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            callbacks: Rc::new(CallbackRegistry::new()),
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn callbacks(&self) -> &Rc<CallbackRegistry> {
        &self.callbacks
    }

    /// Delivers `record`. Never fails; problems are reported as outcomes.
    pub fn submit(&self, record: &SubmissionRecord) -> PendingDelivery {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            return Box::pin(async { RemoteOutcome::NotConfigured });
        };
        match self.config.mode {
            DeliveryMode::Opaque => match submission_url(endpoint, record, None) {
                Some(url) => self.transport.fetch_opaque(&url),
                None => not_configured(endpoint),
            },
            DeliveryMode::Callback => {
                let (id, receiver) = self.callbacks.register();
                let Some(url) = submission_url(endpoint, record, Some(&id.callback_name())) else {
                    self.callbacks.settle(id, RemoteOutcome::NotConfigured);
                    return not_configured(endpoint);
                };
                self.transport.load_script(&url, id, self.callbacks.clone());
                Box::pin(async move { receiver.await.unwrap_or(RemoteOutcome::NetworkError) })
            }
        }
    }
}

fn not_configured(endpoint: &str) -> PendingDelivery {
    log::warn!("RSVP endpoint '{endpoint}' is not a valid url");
    Box::pin(async { RemoteOutcome::NotConfigured })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use super::*;
    use crate::record::{InvitationPreference, YesNo};

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            submitted_at: 1_700_000_000_000,
            attending: YesNo::Yes,
            name: "Alex Kim & Co".to_string(),
            email: "alex@example.com".to_string(),
            phone: String::new(),
            invitation_preference: InvitationPreference::Email,
            bringing_plus_one: Some(YesNo::No),
            plus_one_name: String::new(),
            additional_guests: None,
            additional_guests_count: None,
        }
    }

    fn poll_once<F: Future>(future: F) -> Poll<F::Output> {
        let mut future = pin!(future);
        future.as_mut().poll(&mut Context::from_waker(Waker::noop()))
    }

    #[derive(Clone, Copy)]
    enum ScriptBehavior {
        InvokeCallback,
        FailToLoad,
        Stall,
    }

    struct FakeTransport {
        fetch_outcome: RemoteOutcome,
        script: ScriptBehavior,
        requested: RefCell<Vec<Url>>,
        cleanups: Rc<Cell<usize>>,
    }

    impl FakeTransport {
        fn new(script: ScriptBehavior) -> Self {
            Self {
                fetch_outcome: RemoteOutcome::Success,
                script,
                requested: RefCell::new(Vec::new()),
                cleanups: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Transport for FakeTransport {
        fn fetch_opaque(&self, url: &Url) -> PendingDelivery {
            self.requested.borrow_mut().push(url.clone());
            let outcome = self.fetch_outcome;
            Box::pin(async move { outcome })
        }

        fn load_script(&self, url: &Url, id: CallbackId, callbacks: Rc<CallbackRegistry>) {
            self.requested.borrow_mut().push(url.clone());
            let cleanups = self.cleanups.clone();
            callbacks.on_settle(id, Box::new(move || cleanups.set(cleanups.get() + 1)));
            match self.script {
                ScriptBehavior::InvokeCallback => {
                    callbacks.settle(id, RemoteOutcome::Success);
                }
                ScriptBehavior::FailToLoad => {
                    callbacks.settle(id, RemoteOutcome::NetworkError);
                }
                ScriptBehavior::Stall => {}
            }
        }
    }

    fn client(mode: DeliveryMode, script: ScriptBehavior) -> RemoteClient<FakeTransport> {
        let config = RemoteConfig {
            endpoint: Some("https://script.example.com/macros/exec".to_string()),
            mode,
        };
        RemoteClient::new(config, FakeTransport::new(script))
    }

    #[test]
    fn url_encodes_record_fields() {
        let url = submission_url("https://example.com/exec?sheet=rsvp", &record(), None).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["sheet"], "rsvp");
        assert_eq!(pairs["name"], "Alex Kim & Co");
        assert_eq!(pairs["attending"], "yes");
        assert_eq!(pairs["bringingPlusOne"], "no");
        assert_eq!(pairs["additionalGuests"], "");
        assert!(!pairs.contains_key(CALLBACK_PARAMETER));
        assert!(url.as_str().contains("name=Alex+Kim+%26+Co"));
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        assert!(submission_url("/rsvp", &record(), None).is_none());
        assert!(submission_url("mailto:hosts@example.com", &record(), None).is_none());
    }

    #[test]
    fn missing_endpoint_is_not_configured() {
        let client = RemoteClient::new(RemoteConfig::default(), FakeTransport::new(ScriptBehavior::Stall));
        assert_eq!(poll_once(client.submit(&record())), Poll::Ready(RemoteOutcome::NotConfigured));
        assert!(client.transport.requested.borrow().is_empty());
    }

    #[test]
    fn opaque_mode_fetches_once() {
        let client = client(DeliveryMode::Opaque, ScriptBehavior::Stall);
        assert_eq!(poll_once(client.submit(&record())), Poll::Ready(RemoteOutcome::Success));
        assert_eq!(client.transport.requested.borrow().len(), 1);
    }

    #[test]
    fn callback_mode_succeeds_when_invoked() {
        let client = client(DeliveryMode::Callback, ScriptBehavior::InvokeCallback);
        assert_eq!(poll_once(client.submit(&record())), Poll::Ready(RemoteOutcome::Success));

        let url = client.transport.requested.borrow()[0].clone();
        let callback = url
            .query_pairs()
            .find(|(name, _)| name == CALLBACK_PARAMETER)
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert!(callback.starts_with(CALLBACK_NAME_PREFIX));
        assert_eq!(client.callbacks().pending_count(), 0);
        assert_eq!(client.transport.cleanups.get(), 1);
    }

    #[test]
    fn callback_mode_load_failure_is_network_error() {
        let client = client(DeliveryMode::Callback, ScriptBehavior::FailToLoad);
        assert_eq!(poll_once(client.submit(&record())), Poll::Ready(RemoteOutcome::NetworkError));
        assert_eq!(client.callbacks().pending_count(), 0);
        assert_eq!(client.transport.cleanups.get(), 1);
    }

    #[test]
    fn stalled_callback_stays_pending() {
        let client = client(DeliveryMode::Callback, ScriptBehavior::Stall);
        assert_eq!(poll_once(client.submit(&record())), Poll::Pending);
        assert_eq!(client.callbacks().pending_count(), 1);
        assert_eq!(client.transport.cleanups.get(), 0);
    }

    #[test]
    fn registry_settles_exactly_once() {
        let registry = CallbackRegistry::new();
        let (id, mut receiver) = registry.register();
        let cleanups = Rc::new(Cell::new(0));
        registry.on_settle(id, {
            let cleanups = cleanups.clone();
            Box::new(move || cleanups.set(cleanups.get() + 1))
        });

        assert!(registry.is_pending(id));
        assert!(registry.settle(id, RemoteOutcome::Success));
        assert!(!registry.settle(id, RemoteOutcome::NetworkError));
        assert!(!registry.is_pending(id));
        assert_eq!(cleanups.get(), 1);
        assert_eq!(receiver.try_recv(), Ok(Some(RemoteOutcome::Success)));
    }

    #[test]
    fn late_cleanup_runs_immediately() {
        let registry = CallbackRegistry::new();
        let (id, _receiver) = registry.register();
        registry.settle(id, RemoteOutcome::NetworkError);
        let ran = Rc::new(Cell::new(false));
        registry.on_settle(id, {
            let ran = ran.clone();
            Box::new(move || ran.set(true))
        });
        assert!(ran.get());
    }

    #[test]
    fn callback_names_are_unique() {
        assert_ne!(CallbackId::new().callback_name(), CallbackId::new().callback_name());
    }
}
