use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ses_mailer::{
    Attachment, EmailMessage, MailBackend, MailerError, RawEmailClient, SendObserver, SesBackend,
};

// -- Fake SES client ------------------------------------------------------

#[derive(Debug, Clone)]
struct RecordedSend {
    source: String,
    destinations: Vec<String>,
    raw: Vec<u8>,
}

#[derive(Debug, Default)]
struct FakeClient {
    calls: Mutex<Vec<RecordedSend>>,
    outcomes: Mutex<VecDeque<Result<String, MailerError>>>,
}

impl FakeClient {
    fn with_outcomes(outcomes: Vec<Result<String, MailerError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcomes: Mutex::new(outcomes.into()),
        })
    }

    fn calls(&self) -> Vec<RecordedSend> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RawEmailClient for FakeClient {
    async fn send_raw(
        &self,
        source: &str,
        destinations: &[String],
        raw: Vec<u8>,
    ) -> Result<String, MailerError> {
        self.calls.lock().unwrap().push(RecordedSend {
            source: source.to_owned(),
            destinations: destinations.to_vec(),
            raw,
        });
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("unqueued-id".to_owned()))
    }

    async fn health_check(&self) -> Result<(), MailerError> {
        Ok(())
    }
}

// -- Recording observer ---------------------------------------------------

#[derive(Default)]
struct RecordingObserver {
    pre: Mutex<Vec<String>>,
    post: Mutex<Vec<(String, String)>>,
}

impl RecordingObserver {
    fn pre_subjects(&self) -> Vec<String> {
        self.pre.lock().unwrap().clone()
    }

    fn post_events(&self) -> Vec<(String, String)> {
        self.post.lock().unwrap().clone()
    }
}

impl SendObserver for RecordingObserver {
    fn on_pre_send(&self, message: &EmailMessage) {
        self.pre.lock().unwrap().push(message.subject.clone());
    }

    fn on_post_send(&self, message: &EmailMessage, message_id: &str) {
        self.post
            .lock()
            .unwrap()
            .push((message.subject.clone(), message_id.to_owned()));
    }
}

// -- Helpers --------------------------------------------------------------

fn message(subject: &str, recipients: &[&str]) -> EmailMessage {
    let mut msg = EmailMessage::new("sender@example.com", subject).with_body("body text");
    for recipient in recipients {
        msg = msg.with_to(*recipient);
    }
    msg
}

fn backend_with(
    fail_silently: bool,
    client: &Arc<FakeClient>,
) -> (SesBackend, Arc<RecordingObserver>) {
    let mut backend = SesBackend::with_client(fail_silently, client.clone());
    let observer = Arc::new(RecordingObserver::default());
    backend.add_observer(observer.clone());
    (backend, observer)
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn empty_batch_returns_zero_without_processing() {
    let client = FakeClient::with_outcomes(vec![]);
    let (backend, observer) = backend_with(false, &client);

    let sent = backend.send_messages(&[]).await.unwrap();

    assert_eq!(sent, 0);
    assert!(client.calls().is_empty());
    assert!(observer.pre_subjects().is_empty());
    assert!(observer.post_events().is_empty());
}

#[tokio::test]
async fn message_without_recipients_is_skipped() {
    let client = FakeClient::with_outcomes(vec![]);
    let (backend, observer) = backend_with(false, &client);

    let sent = backend
        .send_messages(&[message("no one home", &[])])
        .await
        .unwrap();

    assert_eq!(sent, 0);
    assert!(client.calls().is_empty(), "no remote call for empty recipients");
    assert_eq!(observer.pre_subjects(), vec!["no one home"]);
    assert!(observer.post_events().is_empty());
}

#[tokio::test]
async fn successful_send_submits_crlf_bytes_and_notifies() {
    let client = FakeClient::with_outcomes(vec![Ok("msg-001".to_owned())]);
    let (backend, observer) = backend_with(false, &client);

    let sent = backend
        .send_messages(&[message("greetings", &["to@example.com"])])
        .await
        .unwrap();

    assert_eq!(sent, 1);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source, "sender@example.com");
    assert_eq!(calls[0].destinations, vec!["to@example.com"]);

    let raw = String::from_utf8(calls[0].raw.clone()).unwrap();
    assert!(raw.contains("\r\n"));
    let stripped = raw.replace("\r\n", "");
    assert!(!stripped.contains('\n'), "all line endings must be CRLF");

    assert_eq!(observer.pre_subjects(), vec!["greetings"]);
    assert_eq!(
        observer.post_events(),
        vec![("greetings".to_owned(), "msg-001".to_owned())]
    );
}

#[tokio::test]
async fn all_recipient_kinds_reach_the_destination_list() {
    let client = FakeClient::with_outcomes(vec![Ok("msg-002".to_owned())]);
    let (backend, _observer) = backend_with(false, &client);

    let msg = EmailMessage::new("sender@example.com", "everyone")
        .with_to("to@example.com")
        .with_cc("cc@example.com")
        .with_bcc("bcc@example.com")
        .with_body("hi")
        .with_attachment(Attachment::new("a.txt", "text/plain", b"abc".to_vec()));

    let sent = backend.send_messages(&[msg]).await.unwrap();

    assert_eq!(sent, 1);
    assert_eq!(
        client.calls()[0].destinations,
        vec!["to@example.com", "cc@example.com", "bcc@example.com"]
    );
}

#[tokio::test]
async fn client_error_propagates_and_aborts_batch() {
    let client = FakeClient::with_outcomes(vec![
        Ok("msg-010".to_owned()),
        Err(MailerError::Client("MessageRejected".to_owned())),
        Ok("msg-012".to_owned()),
    ]);
    let (backend, observer) = backend_with(false, &client);

    let batch = [
        message("first", &["a@example.com"]),
        message("second", &["b@example.com"]),
        message("third", &["c@example.com"]),
    ];
    let result = backend.send_messages(&batch).await;

    assert!(matches!(result, Err(MailerError::Client(_))));
    assert_eq!(client.calls().len(), 2, "third message never attempted");
    assert_eq!(observer.pre_subjects(), vec!["first", "second"]);
    assert_eq!(observer.post_events().len(), 1);
}

#[tokio::test]
async fn fail_silently_swallows_client_errors_and_continues() {
    let client = FakeClient::with_outcomes(vec![
        Ok("msg-020".to_owned()),
        Err(MailerError::Client("Throttling".to_owned())),
        Ok("msg-022".to_owned()),
    ]);
    let (backend, observer) = backend_with(true, &client);

    let batch = [
        message("first", &["a@example.com"]),
        message("second", &["b@example.com"]),
        message("third", &["c@example.com"]),
    ];
    let sent = backend.send_messages(&batch).await.unwrap();

    assert_eq!(sent, 2, "failed message excluded from the count");
    assert_eq!(client.calls().len(), 3, "all messages attempted");
    assert_eq!(observer.pre_subjects(), vec!["first", "second", "third"]);
    assert_eq!(
        observer.post_events(),
        vec![
            ("first".to_owned(), "msg-020".to_owned()),
            ("third".to_owned(), "msg-022".to_owned()),
        ]
    );
}

#[tokio::test]
async fn fail_silently_does_not_swallow_address_errors() {
    let client = FakeClient::with_outcomes(vec![Ok("msg-030".to_owned())]);
    let (backend, _observer) = backend_with(true, &client);

    let batch = [
        message("good", &["a@example.com"]),
        message("bad", &["definitely not an address"]),
        message("never reached", &["c@example.com"]),
    ];
    let result = backend.send_messages(&batch).await;

    assert!(matches!(result, Err(MailerError::InvalidAddress(_))));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn mixed_batch_counts_only_delivered_messages() {
    // msgA: two recipients, succeeds with id "abc123"; msgB: no recipients.
    let client = FakeClient::with_outcomes(vec![Ok("abc123".to_owned())]);
    let (backend, observer) = backend_with(false, &client);

    let msg_a = message("msgA", &["one@example.com", "two@example.com"]);
    let msg_b = message("msgB", &[]);
    let sent = backend.send_messages(&[msg_a, msg_b]).await.unwrap();

    assert_eq!(sent, 1);
    assert_eq!(observer.pre_subjects(), vec!["msgA", "msgB"]);
    assert_eq!(
        observer.post_events(),
        vec![("msgA".to_owned(), "abc123".to_owned())]
    );
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].destinations,
        vec!["one@example.com", "two@example.com"]
    );
}

#[tokio::test]
async fn observers_fire_in_registration_order() {
    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl SendObserver for Tagged {
        fn on_pre_send(&self, _message: &EmailMessage) {
            self.log.lock().unwrap().push(format!("{}-pre", self.tag));
        }

        fn on_post_send(&self, _message: &EmailMessage, _message_id: &str) {
            self.log.lock().unwrap().push(format!("{}-post", self.tag));
        }
    }

    let client = FakeClient::with_outcomes(vec![Ok("msg-040".to_owned())]);
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut backend = SesBackend::with_client(false, client.clone());
    backend.add_observer(Arc::new(Tagged {
        tag: "first",
        log: Arc::clone(&log),
    }));
    backend.add_observer(Arc::new(Tagged {
        tag: "second",
        log: Arc::clone(&log),
    }));

    backend
        .send_messages(&[message("ordered", &["a@example.com"])])
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["first-pre", "second-pre", "first-post", "second-post"]
    );
}

#[tokio::test]
async fn backend_reports_its_name_and_health() {
    let client = FakeClient::with_outcomes(vec![]);
    let (backend, _observer) = backend_with(false, &client);

    assert_eq!(backend.backend_name(), "ses");
    backend.health_check().await.unwrap();
}
